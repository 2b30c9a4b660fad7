fn main() {
    std::process::exit(nosig::nosig_main());
}
