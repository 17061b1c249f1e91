fn main() {
    #[cfg(feature = "cli")]
    metastring::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("metastring: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
