//! Dork query generation.
//!
//! Expands an ordered parameter/term mapping into rendered search queries,
//! either one query per `(parameter, term)` pair or the Cartesian product
//! across parameters. Everything here is pure string work; the engines
//! consume the output verbatim.

/// Ordered parameter/term mapping.
///
/// Encounter order is meaningful: it fixes the order of generated queries and
/// the axis order of Cartesian combination. The empty-string key carries raw
/// keywords that render without any operator.
pub type ParamMap = Vec<(String, Vec<String>)>;

/// Normalize a dork parameter so `site` becomes `site:` while `site:` passes
/// through unchanged. The empty string stays empty and a lone `"` is left
/// alone rather than turned into `":`.
#[must_use]
pub fn normalize_param(param: &str) -> String {
    let p = param.trim();
    if p.is_empty() {
        return String::new();
    }
    if p.ends_with(':') || p == "\"" {
        p.to_string()
    } else {
        format!("{p}:")
    }
}

/// Render one `(parameter, term)` pair into a query fragment.
///
/// An empty parameter yields the bare term, `phrase` (case-insensitive)
/// yields the term wrapped in double quotes, anything else yields
/// `param:term`. A parameter that normalizes to just `:` is unusable and
/// downgrades to the bare term.
#[must_use]
pub fn render_pair(param: &str, term: &str) -> String {
    let p = param.trim();
    let t = term.trim();
    if p.is_empty() {
        return t.to_string();
    }
    if p.eq_ignore_ascii_case("phrase") {
        return format!("\"{t}\"");
    }
    let pnorm = normalize_param(p);
    if pnorm == ":" {
        return t.to_string();
    }
    format!("{pnorm}{t}")
}

/// Expand a parameter map into a deduplicated list of query strings.
///
/// With `combine` unset every usable `(parameter, term)` pair becomes its own
/// query, ordered by parameter encounter order. With `combine` set each
/// parameter's rendered terms form one axis of a Cartesian product and every
/// combination joins into a single space-separated query. Parameters without
/// usable terms contribute nothing in either mode; duplicate queries keep
/// their first occurrence.
#[must_use]
pub fn build_queries(params_to_terms: &[(String, Vec<String>)], combine: bool) -> Vec<String> {
    if params_to_terms.is_empty() {
        return Vec::new();
    }

    if !combine {
        let rendered = params_to_terms.iter().flat_map(|(param, terms)| {
            terms
                .iter()
                .filter(|term| !term.trim().is_empty())
                .map(move |term| render_pair(param, term))
        });
        return dedup_first_seen(rendered);
    }

    // Every parameter with at least one usable term contributes one axis.
    let axes: Vec<Vec<String>> = params_to_terms
        .iter()
        .map(|(param, terms)| {
            terms
                .iter()
                .filter(|term| !term.trim().is_empty())
                .map(|term| render_pair(param, term))
                .collect::<Vec<_>>()
        })
        .filter(|axis| !axis.is_empty())
        .collect();

    if axes.is_empty() {
        return Vec::new();
    }

    dedup_first_seen(cartesian(&axes))
}

/// Walk the Cartesian product of `axes` with an index odometer (rightmost
/// axis fastest), joining each combination with single spaces.
fn cartesian(axes: &[Vec<String>]) -> Vec<String> {
    let mut out = Vec::with_capacity(axes.iter().map(Vec::len).product());
    let mut indices = vec![0usize; axes.len()];

    loop {
        let combo: Vec<&str> = indices
            .iter()
            .zip(axes)
            .map(|(&i, axis)| axis[i].as_str())
            .collect();
        out.push(combo.join(" "));

        let mut pos = axes.len();
        loop {
            if pos == 0 {
                return out;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < axes[pos].len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}

fn dedup_first_seen<I>(queries: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    queries
        .into_iter()
        .filter(|query| seen.insert(query.clone()))
        .collect()
}
