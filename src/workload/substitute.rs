use super::params::RunParameters;
use super::store::RequestTemplate;

/// URL and body of one request after placeholder replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutedRequest {
    pub url: String,
    pub body: Vec<u8>,
}

/// Replaces every occurrence of each non-empty field of `old` with the
/// matching field of `new`, in the URL and the body independently.
///
/// All fields are replaced in one left-to-right scan of the template, so a
/// placeholder that contains another (seed `1234` inside lat `45.512345`)
/// is still replaced whole, and inserted values are never rescanned.
#[must_use]
pub fn substitute(
    template: &RequestTemplate,
    old: &RunParameters,
    new: &RunParameters,
) -> SubstitutedRequest {
    let replacements: Vec<(&[u8], &[u8])> = old
        .fields()
        .into_iter()
        .zip(new.fields())
        .filter(|(from, _)| !from.is_empty())
        .map(|(from, to)| (from.as_bytes(), to.as_bytes()))
        .collect();
    if replacements.is_empty() {
        return SubstitutedRequest {
            url: template.url.clone(),
            body: template.body.clone(),
        };
    }

    let url_bytes = replace_literals(template.url.as_bytes(), &replacements);
    let url = String::from_utf8(url_bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
    SubstitutedRequest {
        url,
        body: replace_literals(&template.body, &replacements),
    }
}

/// Literal, non-overlapping, left-to-right replacement of every `from` in
/// `replacements`. Where several match at one position the longest wins,
/// and the first listed wins among equal lengths. Empty patterns never
/// match.
#[must_use]
pub fn replace_literals(haystack: &[u8], replacements: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut output = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some((&first, tail)) = rest.split_first() {
        match longest_match(rest, replacements) {
            Some((from, to)) => {
                output.extend_from_slice(to);
                rest = rest.get(from.len()..).unwrap_or_default();
            }
            None => {
                output.push(first);
                rest = tail;
            }
        }
    }
    output
}

fn longest_match<'pair>(
    rest: &[u8],
    replacements: &[(&'pair [u8], &'pair [u8])],
) -> Option<(&'pair [u8], &'pair [u8])> {
    let mut best: Option<(&[u8], &[u8])> = None;
    for &(from, to) in replacements {
        if from.is_empty() || !rest.starts_with(from) {
            continue;
        }
        if best.is_none_or(|(longest, _)| from.len() > longest.len()) {
            best = Some((from, to));
        }
    }
    best
}

/// Joins the host with a substituted path and appends the session
/// credential as query parameters.
#[must_use]
pub fn compose_url(host: &str, path: &str, credential: &str) -> String {
    let mut url = String::with_capacity(
        host.len()
            .saturating_add(path.len())
            .saturating_add(credential.len())
            .saturating_add(1),
    );
    url.push_str(host);
    if host.ends_with('/') && path.starts_with('/') {
        url.pop();
    }
    url.push_str(path);
    if !credential.is_empty() {
        url.push(if path.contains('?') { '&' } else { '?' });
        url.push_str(credential);
    }
    url
}
