/// Capabilities of the client platform, detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Platform {
    /// Touch is the primary input and pointer capture is not available.
    pub touch_primary: bool,
}

const TOUCH_AGENTS: [&str; 4] = ["iphone", "ipad", "ipod", "android"];

impl Platform {
    pub fn desktop() -> Self {
        Self {
            touch_primary: false,
        }
    }

    pub fn touch() -> Self {
        Self {
            touch_primary: true,
        }
    }

    /// Detect from a browser user-agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        Self {
            touch_primary: TOUCH_AGENTS.iter().any(|needle| ua.contains(needle)),
        }
    }

    pub fn supports_pointer_capture(&self) -> bool {
        !self.touch_primary
    }
}
