pub fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}

pub fn default_exec_path() -> String {
    "/exec".to_string()
}

pub fn default_table() -> String {
    "positions".to_string()
}

pub fn default_instruments() -> Vec<String> {
    vec![
        "EURUSD".to_string(),
        "XAUUSD".to_string(),
        "GBPUSD".to_string(),
    ]
}

pub fn default_positions_per_round() -> u32 {
    3
}

pub fn default_trade_pause_ms() -> u64 {
    500
}

pub fn default_round_pause_ms() -> u64 {
    2000
}

pub fn default_stagger_ms() -> u64 {
    200
}

pub fn default_connection_backoff_ms() -> u64 {
    5000
}

pub fn default_drain_timeout_ms() -> u64 {
    5000
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_metrics_port() -> u16 {
    9100
}
