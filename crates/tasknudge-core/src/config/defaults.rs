//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "tasknudge".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_timezone() -> String {
    "Europe/Kyiv".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_deny_message() -> String {
    "Unauthorized".to_string()
}

pub fn default_todoist_base_url() -> String {
    "https://api.todoist.com/rest".to_string()
}

pub fn default_retries() -> u32 {
    5
}

pub fn default_retry_delay_ms() -> u64 {
    1000
}

pub fn default_request_timeout_secs() -> u64 {
    5
}

pub fn default_project_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

pub fn default_schedule() -> String {
    "0 0 9-23 * * *".to_string()
}

pub fn default_job_timeout_secs() -> u64 {
    60
}

pub fn default_state_timeout_hours() -> u64 {
    24
}

pub fn default_handler_timeout_secs() -> u64 {
    10
}
