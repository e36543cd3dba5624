use server::Config;
use server::config::Opts;

fn print_version_and_exit() -> ! {
    // These are set by build.rs; fall back to unknown if missing
    let pkg_version = env!("CARGO_PKG_VERSION");
    let commit = option_env!("GIT_COMMIT").unwrap_or("unknown");
    let state = option_env!("GIT_STATE").unwrap_or("unknown");
    let built = option_env!("BUILD_TIME").unwrap_or("unknown time");
    println!(
        "server {} (commit: {}, state: {}, built: {})",
        pkg_version, commit, state, built
    );
    std::process::exit(0)
}

fn main() {
    let opts = Opts::from_args();

    if opts.version {
        print_version_and_exit();
    }

    if opts.debug {
        unsafe { std::env::set_var("DEBUG_MODE", "1") };
    }

    let cfg_path = opts.config.as_deref().and_then(|p| p.to_str());
    let config = match Config::from_config(cfg_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run_blocking(config) {
        eprintln!("Server failed: {}", e);
        std::process::exit(1);
    }
}
