//! Deep links on static hosts.
//!
//! A static host answers unknown paths with its 404 page, which bounces the
//! browser back to the app with the original location packed into the query
//! as `?p=<path>&q=<query>` (`&` inside either value written as `~and~`).
//! Before the router starts, the packed location is unpacked into the hash
//! route the app actually uses.

use log::{info, warn};
use wasm_bindgen::JsValue;

/// Rewrites the current URL in place if it carries a packed location.
pub fn apply() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let location = window.location();
    let current = (|| -> Result<_, JsValue> {
        Ok((
            location.origin()?,
            location.pathname()?,
            location.search()?,
            location.hash()?,
        ))
    })();
    let (origin, pathname, search, hash) = match current {
        Ok(parts) => parts,
        Err(err) => {
            warn!("error reading location: {err:?}");
            return;
        }
    };

    let Some(url) = canonical_url(&origin, &pathname, &search, &hash) else {
        return;
    };
    let replaced = window
        .history()
        .and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(&url)));
    match replaced {
        Ok(()) => info!("restored deep link {url}"),
        Err(err) => warn!("error restoring deep link: {err:?}"),
    }
}

/// The URL to switch to, or `None` if there is nothing to unpack.
pub fn canonical_url(origin: &str, pathname: &str, search: &str, hash: &str) -> Option<String> {
    let path = query_param(search, "p")?;
    let query = query_param(search, "q").filter(|query| !query.is_empty());

    let base = pathname.trim_end_matches('/');
    let mut url = format!("{origin}{base}/");
    if let Some(query) = query {
        url.push('?');
        url.push_str(&query);
    }
    if hash.is_empty() {
        url.push('#');
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&path);
    } else {
        url.push_str(hash);
    }

    let current = format!("{origin}{pathname}{search}{hash}");
    (url != current).then_some(url)
}

/// Value of `key` in a `?a=b&c=d` query string, with `~and~` decoded.
pub fn query_param(search: &str, key: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.replace("~and~", "&"))
}
