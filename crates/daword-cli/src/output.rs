//! CLI output styling for daword

use colored::Colorize;
use daword::ClauseLibrary;
use daword_proxy::ProxyHandle;

/// Print the daword banner
pub fn print_banner(silent: bool) {
    if silent {
        return;
    }

    let version = env!("CARGO_PKG_VERSION");
    let title = "daword".truecolor(0, 114, 198).bold();
    let ver = format!("v{}", version).white();

    eprintln!();
    eprintln!("  {} {}", title, ver);
    eprintln!("  {}", "docassemble for Word".truecolor(150, 150, 150));
    eprintln!();
}

/// Print where the proxy is listening and what it forwards to
pub fn print_proxy_ready(handle: &ProxyHandle, origin: &str, silent: bool) {
    if silent {
        return;
    }

    let base = format!("https://localhost:{}", handle.port);
    eprintln!(
        "{} {}",
        "HTTPS proxy running on".green(),
        base.white().bold()
    );
    eprintln!("  Forwarding requests to: {}", origin);
    eprintln!("  Manifest URL: {}/manifest.xml", base);
    if handle.self_signed {
        eprintln!(
            "  {}",
            "Using a self-signed certificate; trust it in your browser before sideloading."
                .yellow()
        );
    }
    eprintln!("  Press Ctrl+C to stop.");
    eprintln!();
}

/// Print the clause keys with their titles
pub fn print_clause_list(library: &ClauseLibrary) {
    println!("{}", "Available clauses:".white().bold());
    for (key, _) in library.iter() {
        println!("  {:<16} {}", key.as_str().cyan(), key.title());
    }
}
