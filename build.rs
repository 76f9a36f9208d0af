fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Build scripts run on the host; the target triple comes from cargo.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
