use lumina_core::{Provider, Settings};

const CHAT_COMPLETIONS: &str = "/chat/completions";

/// Full chat-completions URL for the configured provider.
///
/// Idempotent: resolving an already resolved endpoint returns it unchanged.
pub fn resolve_endpoint(settings: &Settings) -> String {
    resolve(
        settings.provider,
        &settings.endpoint,
        settings.auto_detect_endpoint,
    )
}

pub(crate) fn resolve(provider: Provider, endpoint: &str, auto_detect: bool) -> String {
    let base = endpoint.trim().trim_end_matches('/');
    if base.ends_with(CHAT_COMPLETIONS) {
        return base.to_string();
    }

    let version = if auto_detect && is_google_style(provider, base) {
        "/v1beta"
    } else {
        "/v1"
    };

    let mut url = base.to_string();
    if !url.ends_with(version) {
        url.push_str(version);
    }
    url.push_str(CHAT_COMPLETIONS);
    url
}

fn is_google_style(provider: Provider, endpoint: &str) -> bool {
    provider == Provider::Google
        || Provider::Google
            .domain()
            .is_some_and(|domain| endpoint.contains(domain))
}

/// Known provider whose domain appears in `endpoint`, if any.
pub fn provider_for_endpoint(endpoint: &str) -> Option<Provider> {
    Provider::ALL.into_iter().find(|p| {
        p.domain()
            .is_some_and(|domain| endpoint.contains(domain))
    })
}
