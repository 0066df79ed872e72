use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// `(singular, plural)` pairs that bypass the regex rules.
const IRREGULARS: &[(&str, &str)] = &[
    ("i", "we"),
    ("me", "us"),
    ("he", "they"),
    ("she", "they"),
    ("them", "them"),
    ("myself", "ourselves"),
    ("yourself", "yourselves"),
    ("itself", "themselves"),
    ("herself", "themselves"),
    ("himself", "themselves"),
    ("themself", "themselves"),
    ("is", "are"),
    ("was", "were"),
    ("has", "have"),
    ("this", "these"),
    ("that", "those"),
    ("my", "our"),
    ("its", "their"),
    ("his", "their"),
    ("her", "their"),
    ("echo", "echoes"),
    ("dingo", "dingoes"),
    ("volcano", "volcanoes"),
    ("tornado", "tornadoes"),
    ("torpedo", "torpedoes"),
    ("genus", "genera"),
    ("viscus", "viscera"),
    ("stigma", "stigmata"),
    ("stoma", "stomata"),
    ("dogma", "dogmata"),
    ("lemma", "lemmata"),
    ("schema", "schemata"),
    ("anathema", "anathemata"),
    ("ox", "oxen"),
    ("axe", "axes"),
    ("die", "dice"),
    ("yes", "yeses"),
    ("foot", "feet"),
    ("eave", "eaves"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("quiz", "quizzes"),
    ("human", "humans"),
    ("proof", "proofs"),
    ("carve", "carves"),
    ("valve", "valves"),
    ("looey", "looies"),
    ("thief", "thieves"),
    ("groove", "grooves"),
    ("pickaxe", "pickaxes"),
    ("passerby", "passersby"),
    ("canvas", "canvases"),
];

/// Pattern and replacement pairs, in registration order. Later rules win.
const PLURAL_RULES: &[(&str, &str)] = &[
    (r"s?$", "s"),
    (r"[^\x00-\x7F]$", "$0"),
    (r"([^aeiou]ese)$", "$1"),
    (r"(ax|test)is$", "$1es"),
    (r"(alias|[^aou]us|t[lm]as|gas|ris)$", "$1es"),
    (r"(e[mn]u)s?$", "$1s"),
    (r"([^l]ias|[aeiou]las|[ejzr]as|[iu]am)$", "$1"),
    (
        r"(alumn|syllab|vir|radi|nucle|fung|cact|stimul|termin|bacill|foc|uter|loc|strat)(?:us|i)$",
        "$1i",
    ),
    (r"(alumn|alg|vertebr)(?:a|ae)$", "$1ae"),
    (r"(seraph|cherub)(?:im)?$", "$1im"),
    (r"(her|at|gr)o$", "$1oes"),
    (
        r"(agend|addend|millenni|dat|extrem|bacteri|desiderat|strat|candelabr|errat|ov|symposi|curricul|automat|quor)(?:a|um)$",
        "$1a",
    ),
    (
        r"(apheli|hyperbat|periheli|asyndet|noumen|phenomen|criteri|organ|prolegomen|hedr|automat)(?:a|on)$",
        "$1a",
    ),
    (r"sis$", "ses"),
    (r"(?:(kni|wi|li)fe|(ar|l|ea|eo|oa|hoo)f)$", "$1$2ves"),
    (r"([^aeiouy]|qu)y$", "$1ies"),
    (r"([^ch][ieo][ln])ey$", "$1ies"),
    (r"(x|ch|ss|sh|zz)$", "$1es"),
    (r"(matr|cod|mur|sil|vert|ind|append)(?:ix|ex)$", "$1ices"),
    (r"\b((?:tit)?m|l)(?:ice|ouse)$", "$1ice"),
    (r"(pe)(?:rson|ople)$", "$1ople"),
    (r"(child)(?:ren)?$", "$1ren"),
    (r"eaux$", "$0"),
    (r"m[ae]n$", "men"),
    (r"^thou$", "you"),
];

const UNCOUNTABLE_WORDS: &[&str] = &[
    "adequate", "advice", "aircraft", "alcohol", "ammo", "analytics", "anime", "athletics",
    "audio", "bison", "blood", "bream", "buffalo", "butter", "carp", "cash", "chassis", "chess",
    "clothing", "cod", "commerce", "cooperation", "corps", "debris", "diabetes", "digestion",
    "elk", "energy", "equipment", "excretion", "expertise", "firmware", "flounder", "fun",
    "gallows", "garbage", "graffiti", "hardware", "headquarters", "health", "herpes",
    "highjinks", "homework", "housework", "information", "jeans", "justice", "kudos", "labour",
    "literature", "machinery", "mackerel", "mail", "media", "mews", "moose", "music", "mud",
    "manga", "news", "only", "personnel", "pike", "plankton", "pliers", "police", "pollution",
    "premises", "rain", "research", "rice", "salmon", "scissors", "series", "sewage",
    "shambles", "shrimp", "software", "staff", "swine", "tennis", "traffic", "transportation",
    "trout", "tuna", "wealth", "welfare", "whiting", "wildebeest", "wildlife", "you",
];

/// Uncountable patterns take priority over every plural rule.
const UNCOUNTABLE_PATTERNS: &[&str] = &[
    r"pok[eé]mon$",
    r"[^aeiou]ese$",
    r"deer$",
    r"fish$",
    r"measles$",
    r"o[iu]s$",
    r"pox$",
    r"sheep$",
];

struct Inflector {
    singular_to_plural: HashMap<&'static str, &'static str>,
    plurals: HashSet<&'static str>,
    uncountable: HashSet<&'static str>,
    rules: Vec<(Regex, &'static str)>,
}

static INFLECTOR: LazyLock<Inflector> = LazyLock::new(Inflector::new);

impl Inflector {
    fn new() -> Self {
        let rules = PLURAL_RULES
            .iter()
            .copied()
            .chain(UNCOUNTABLE_PATTERNS.iter().map(|pattern| (*pattern, "$0")))
            .map(|(pattern, replacement)| {
                let regex = Regex::new(&format!("(?i){pattern}"))
                    .expect("plural rule patterns are valid");
                (regex, replacement)
            })
            .collect();

        Self {
            singular_to_plural: IRREGULARS.iter().copied().collect(),
            plurals: IRREGULARS.iter().map(|(_, plural)| *plural).collect(),
            uncountable: UNCOUNTABLE_WORDS.iter().copied().collect(),
            rules,
        }
    }

    fn pluralize(&self, word: &str) -> String {
        let token = word.to_lowercase();

        if self.plurals.contains(token.as_str()) {
            return restore_case(word, &token);
        }
        if let Some(plural) = self.singular_to_plural.get(token.as_str()) {
            return restore_case(word, plural);
        }
        if token.is_empty() || self.uncountable.contains(token.as_str()) {
            return word.to_string();
        }

        for (regex, replacement) in self.rules.iter().rev() {
            if let Some(caps) = regex.captures(word) {
                return apply_rule(word, &caps, replacement);
            }
        }

        word.to_string()
    }
}

/// Pluralize a word using the irregular, uncountable and suffix rule tables.
///
/// Already-plural input is not guaranteed to be a fixed point: `posts` stays
/// `posts`, but `octopi` becomes `octopis`.
pub fn pluralize(word: &str) -> String {
    INFLECTOR.pluralize(word)
}

fn apply_rule(word: &str, caps: &Captures<'_>, replacement: &str) -> String {
    let matched = caps.get(0).map_or_else(|| 0..0, |m| m.range());
    let result = interpolate(replacement, caps);

    let restored = if matched.is_empty() {
        // Empty suffix matches take their case from the preceding character.
        match word[..matched.start].chars().last() {
            Some(prev) => restore_case(&prev.to_string(), &result),
            None => result,
        }
    } else {
        restore_case(&word[matched.clone()], &result)
    };

    format!("{}{}{}", &word[..matched.start], restored, &word[matched.end..])
}

/// Expand `$N` group references; unmatched groups expand to nothing.
fn interpolate(replacement: &str, caps: &Captures<'_>) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek().and_then(|d| d.to_digit(10))) {
            ('$', Some(index)) => {
                chars.next();
                out.push_str(caps.get(index as usize).map_or("", |m| m.as_str()));
            }
            _ => out.push(c),
        }
    }

    out
}

fn restore_case(word: &str, token: &str) -> String {
    if word == token {
        return token.to_string();
    }
    if word == word.to_lowercase() {
        return token.to_lowercase();
    }
    if word == word.to_uppercase() {
        return token.to_uppercase();
    }

    let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
    if starts_upper {
        let mut chars = token.chars();
        return match chars.next() {
            Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str().to_lowercase()),
            None => String::new(),
        };
    }

    token.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_suffixes() {
        assert_eq!(pluralize("article"), "articles");
        assert_eq!(pluralize("author"), "authors");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("analysis"), "analyses");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("hero"), "heroes");
    }

    #[test]
    fn test_irregular_and_uncountable() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("quiz"), "quizzes");
        assert_eq!(pluralize("media"), "media");
        assert_eq!(pluralize("news"), "news");
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("goldfish"), "goldfish");
    }

    #[test]
    fn test_camel_case_words_keep_their_casing() {
        assert_eq!(pluralize("blogPost"), "blogPosts");
        assert_eq!(pluralize("newsCategory"), "newsCategories");
        assert_eq!(pluralize("salesPerson"), "salesPeople");
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("POST"), "POSTS");
    }

    #[test]
    fn test_fixed_points_of_the_rule_table() {
        assert_eq!(pluralize("posts"), "posts");
        assert_eq!(pluralize("people"), "people");
        assert_eq!(pluralize("categories"), "categories");
        assert_eq!(pluralize("statuses"), "statuses");
        assert_eq!(pluralize("children"), "children");
    }

    #[test]
    fn test_plural_input_is_not_always_a_fixed_point() {
        assert_eq!(pluralize("octopi"), "octopis");
        assert_eq!(pluralize("specimen"), "specimen");
    }

    #[test]
    fn test_interpolate_skips_unmatched_groups() {
        let regex = Regex::new(r"(?i)(?:(kni|wi|li)fe|(ar|l|ea|eo|oa|hoo)f)$").unwrap();
        let caps = regex.captures("wolf").unwrap();
        assert_eq!(interpolate("$1$2ves", &caps), "lves");
    }
}
