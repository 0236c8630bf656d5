pub mod binding;
pub mod commands;
pub mod engine;
pub mod error;
pub mod media;
pub mod presence;
pub mod song;
pub mod store;

/// Install `env_logger` for headless runs; honours `RUST_LOG`.
/// Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init();
}
