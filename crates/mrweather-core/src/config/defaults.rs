//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Mr. Weather".to_string()
}

pub fn default_data_dir() -> String {
    "~/.mrweather".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_location() -> String {
    "Irvine".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_db_path() -> String {
    "~/.mrweather/data/users.sqlite".to_string()
}

/// 14:30 UTC is 7:30 AM Pacific (daylight time).
pub fn default_dispatch_time() -> String {
    "14:30".to_string()
}

pub fn default_weather_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

pub fn default_cat_base_url() -> String {
    "https://api.thecatapi.com/v1".to_string()
}

pub fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

pub fn default_temperature() -> f32 {
    0.5
}

pub fn default_max_output_tokens() -> u32 {
    800
}

pub fn default_cache_ttl_secs() -> u64 {
    4 * 60 * 60
}

pub fn default_personality() -> String {
    "Take on the personality of a funny, intelligent, and curious person when replying to this message: ".to_string()
}

pub fn default_motivation_prompt() -> String {
    "Generate a completely unique philosophical daily motivational quote that is perfect to \
     start the day with, but with a humourous and quirky twist."
        .to_string()
}
