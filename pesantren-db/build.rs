fn main() {
    // Migrations are embedded at compile time; rebuild when any of them change.
    println!("cargo:rerun-if-changed=migrations");
}
