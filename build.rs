// build.rs

fn main() {
    // --- Link against X11, Xft and Xinerama ---
    // pkg-config first; if any probe fails we fall back to plain linker flags
    // and assume the libraries live in a standard search path.

    let libraries = ["x11", "xft", "xinerama", "fontconfig", "freetype2"];

    let mut pkg_config_success = true;

    for lib in &libraries {
        if pkg_config::probe_library(lib).is_err() {
            eprintln!(
                "pkg-config failed for library '{}'. Falling back to manual linking.",
                lib
            );
            pkg_config_success = false;
            break;
        }
    }

    if !pkg_config_success {
        println!("cargo:rustc-link-lib=X11");
        println!("cargo:rustc-link-lib=Xft");
        println!("cargo:rustc-link-lib=Xinerama");
        println!("cargo:rustc-link-lib=fontconfig");
        println!("cargo:rustc-link-lib=freetype");
        println!("cargo:rustc-link-search=/usr/lib");
        eprintln!(
            "Manual linking flags applied. Ensure X11, Xft, Xinerama, Fontconfig and Freetype development libraries are installed."
        );
    } else {
        eprintln!("pkg-config successfully found libraries. Linking configured automatically.");
    }
}
