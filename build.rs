fn main() {
    // Stamp the build time so /api/app-info can report it
    let build_timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);

    // Embedded assets are compiled into the binary; rebuild when they change
    println!("cargo:rerun-if-changed=assets");
    println!("cargo:rerun-if-changed=build.rs");

    // Enables static linking of the vcruntime library on Windows builds
    static_vcruntime::metabuild();
}
