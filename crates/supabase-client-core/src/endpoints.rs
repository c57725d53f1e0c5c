use std::fmt;

/// The backend services behind one Supabase project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Rest,
    Realtime,
    Auth,
    Storage,
    Functions,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::Rest,
        Service::Realtime,
        Service::Auth,
        Service::Storage,
        Service::Functions,
    ];

    /// Fixed path suffix appended to the project URL.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Rest => "/rest/v1",
            Self::Realtime => "/realtime/v1",
            Self::Auth => "/auth/v1",
            Self::Storage => "/storage/v1",
            Self::Functions => "/functions/v1",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Realtime => write!(f, "realtime"),
            Self::Auth => write!(f, "auth"),
            Self::Storage => write!(f, "storage"),
            Self::Functions => write!(f, "functions"),
        }
    }
}

/// Service URLs derived from one project URL.
///
/// Each is the project URL with a fixed suffix; the realtime URL also has its
/// scheme switched to `ws`/`wss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest: String,
    pub realtime: String,
    pub auth: String,
    pub storage: String,
    pub functions: String,
}

impl Endpoints {
    pub fn new(supabase_url: &str) -> Self {
        let with = |service: Service| format!("{}{}", supabase_url, service.suffix());
        Self {
            rest: with(Service::Rest),
            realtime: to_websocket(&with(Service::Realtime)),
            auth: with(Service::Auth),
            storage: with(Service::Storage),
            functions: with(Service::Functions),
        }
    }

    pub fn get(&self, service: Service) -> &str {
        match service {
            Service::Rest => &self.rest,
            Service::Realtime => &self.realtime,
            Service::Auth => &self.auth,
            Service::Storage => &self.storage,
            Service::Functions => &self.functions,
        }
    }
}

fn to_websocket(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}
