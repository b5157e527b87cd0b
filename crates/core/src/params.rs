//! Query-string propagation onto redirect destinations.

use url::Url;

/// Merges `params` into the destination's query string. Same-named keys
/// already on the destination are overridden; every other existing pair
/// is preserved.
pub fn merge_query_params<K, V>(url: &mut Url, params: &[(K, V)])
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(new_key, _)| new_key.as_ref() == key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    let mut pairs = url.query_pairs_mut();
    for (key, value) in &kept {
        pairs.append_pair(key, value);
    }
    for (key, value) in params {
        pairs.append_pair(key.as_ref(), value.as_ref());
    }
}
