fn main() {
    std::process::exit(catalog_plugins::app::startup::startup());
}
