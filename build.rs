#[cfg(windows)]
fn main() {
    let mut res = winres::WindowsResource::new();
    res.set("ProductName", "verstamp");
    res.set("FileDescription", "verstamp - version.ver build stamper");
    res.set("LegalCopyright", "© 2025 ChromaBridge Contributors");
    res.set("OriginalFilename", "verstamp.exe");
    res.set("FileVersion", env!("CARGO_PKG_VERSION"));

    if let Err(e) = res.compile() {
        eprintln!("Failed to compile Windows resource: {}", e);
    }
}

#[cfg(not(windows))]
fn main() {
}
