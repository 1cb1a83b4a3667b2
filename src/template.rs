// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Placeholder name to replacement value. Keys are case sensitive and
/// must match the `{NAME}` token exactly.
pub(crate) type SubstitutionContext = HashMap<String, String>;

/// The quoted token rewritten with the joined drill-down values.
const DRILLDOWN_TOKEN: &str = "\"{DRILLDOWN_VALUES}\"";

/// Replace every `{NAME}` token in `template` with the context value
/// of the same name. Tokens with no matching context entry are left
/// untouched, braces included.
pub(crate) fn populate(template: &str, context: &SubstitutionContext) -> String {
    let re = regex::Regex::new(r"\{(\w+)\}").unwrap();
    re.replace_all(template, |caps: &regex::Captures| {
        match context.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Populate a drill-down (step 2) template: the regular substitution
/// pass, then every quoted `"{DRILLDOWN_VALUES}"` token becomes the
/// values joined with `|`. The join intentionally produces a regex
/// alternation, picked up by operator inference when the body is
/// built.
pub(crate) fn populate_drilldown(
    template: &str,
    context: &SubstitutionContext,
    values: &[String],
) -> String {
    let populated = populate(template, context);
    populated.replace(DRILLDOWN_TOKEN, &format!("\"{}\"", values.join("|")))
}
