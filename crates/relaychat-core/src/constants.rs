/// Centralized constants for relaychat.
/// Literals shared between the store, the relay client and the CLI live here.

// ─── Endpoints ────────────────────────────────────────────────────────────────

pub mod endpoints {
    /// CORS relay that forwards `{"query": ...}` to the upstream service.
    pub const RELAY_URL: &str = "https://ams-fabric-proxy.sudhakarn-in.workers.dev";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

// ─── Conversation Defaults ────────────────────────────────────────────────────

pub mod defaults {
    pub const CONVERSATION_TITLE: &str = "New Conversation";
    pub const TITLE_MAX_CHARS: usize = 40;
    pub const TITLE_ELLIPSIS: &str = "...";
    /// Prefix put in front of a failure message before it is stored as an `error` message.
    pub const ERROR_PREFIX: &str = "Error: ";
}

// ─── Relay Responses ──────────────────────────────────────────────────────────

pub mod responses {
    /// Fields probed on a JSON success payload, highest priority first.
    pub const ANSWER_FIELDS: &[&str] = &[
        "name", "answer", "response", "result", "output", "text", "message",
    ];
    /// Raw error bodies at or above this many characters are not echoed back.
    pub const ERROR_BODY_MAX_CHARS: usize = 200;
    pub const NETWORK_ERROR: &str =
        "Network error: Unable to reach the API. Please check your connection.";
}

// ─── Storage & Config Paths ───────────────────────────────────────────────────

pub mod paths {
    pub const STATE_KEY: &str = "relaychat-state";
    pub const DATA_DIR: &str = ".relaychat";
    pub const CONFIG_DIR: &str = "relaychat";
    pub const CONFIG_FILE: &str = "config.toml";
}
