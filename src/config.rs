use std::sync::LazyLock;

use derive_from_env::FromEnv;

#[derive(FromEnv)]
#[from_env(prefix = "ASYNCLOG")]
#[allow(non_snake_case)]
pub struct AsyncLogConfig {
    /// Directory the escalation tier files are created in.
    #[from_env(default = "logs")]
    pub ESCALATION_DIR: String,
}

pub static ASYNCLOG_CONFIG: LazyLock<AsyncLogConfig> =
    LazyLock::new(|| AsyncLogConfig::from_env().unwrap());
