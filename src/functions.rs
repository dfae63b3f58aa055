//! Static index of built-in template functions.
//!
//! The table is registered at compile time; lookup accepts the
//! canonical `ns::name` form, the piped `ns:name` form, and the bare
//! function name.

/// One built-in function. `namespace` is empty for global functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub namespace: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
}

impl FunctionDescriptor {
    /// Canonical lookup key: `ns::name`, or the bare name for global
    /// functions.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        if self.namespace.is_empty() {
            self.name.to_string()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }

    /// Name as written at a pipe call site: `ns:name` or the bare
    /// name.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.to_string()
        } else {
            format!("{}:{}", self.namespace, self.name)
        }
    }

    fn matches(&self, key: &str) -> bool {
        match key.split_once("::").or_else(|| key.split_once(':')) {
            Some((ns, name)) => ns == self.namespace && name == self.name,
            None => key == self.name,
        }
    }
}

/// Every registered built-in, ordered by lookup key.
pub const BUILT_IN_FUNCTIONS: &[FunctionDescriptor] = &[
    FunctionDescriptor {
        namespace: "coll",
        name: "first",
        summary: "First element of a list, or null when empty.",
    },
    FunctionDescriptor {
        namespace: "coll",
        name: "join",
        summary: "Concatenate list elements with a separator string.",
    },
    FunctionDescriptor {
        namespace: "coll",
        name: "last",
        summary: "Last element of a list, or null when empty.",
    },
    FunctionDescriptor {
        namespace: "coll",
        name: "sort",
        summary: "List sorted in natural order.",
    },
    FunctionDescriptor {
        namespace: "",
        name: "default",
        summary: "Fallback value when the input is null or empty.",
    },
    FunctionDescriptor {
        namespace: "",
        name: "empty",
        summary: "True when the input is null, an empty string, or an empty container.",
    },
    FunctionDescriptor {
        namespace: "",
        name: "not",
        summary: "Boolean negation of the input.",
    },
    FunctionDescriptor {
        namespace: "num",
        name: "abs",
        summary: "Absolute value of a number.",
    },
    FunctionDescriptor {
        namespace: "num",
        name: "ceil",
        summary: "Smallest integer not less than the input.",
    },
    FunctionDescriptor {
        namespace: "num",
        name: "floor",
        summary: "Largest integer not greater than the input.",
    },
    FunctionDescriptor {
        namespace: "num",
        name: "round",
        summary: "Input rounded to the nearest integer.",
    },
    FunctionDescriptor {
        namespace: "",
        name: "size",
        summary: "Element count of a string, list, or object.",
    },
    FunctionDescriptor {
        namespace: "str",
        name: "lower",
        summary: "Lower-cased copy of a string.",
    },
    FunctionDescriptor {
        namespace: "str",
        name: "replace",
        summary: "String with every occurrence of a substring replaced.",
    },
    FunctionDescriptor {
        namespace: "str",
        name: "split",
        summary: "List of substrings split on a separator.",
    },
    FunctionDescriptor {
        namespace: "str",
        name: "trim",
        summary: "String with leading and trailing whitespace removed.",
    },
    FunctionDescriptor {
        namespace: "str",
        name: "upper",
        summary: "Upper-cased copy of a string.",
    },
];

/// All built-ins, for completion listings.
#[must_use]
pub fn all() -> &'static [FunctionDescriptor] {
    BUILT_IN_FUNCTIONS
}

/// Look up a built-in by `ns::name`, `ns:name`, or bare name. Bare
/// lookups match the first function with that name in table order.
#[must_use]
pub fn find(key: &str) -> Option<&'static FunctionDescriptor> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    BUILT_IN_FUNCTIONS.iter().find(|f| f.matches(key))
}

/// Built-ins in one namespace, for namespace-filtered completion.
#[must_use]
pub fn in_namespace(namespace: &str) -> impl Iterator<Item = &'static FunctionDescriptor> + '_ {
    BUILT_IN_FUNCTIONS
        .iter()
        .filter(move |f| f.namespace == namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_canonical_form() {
        let upper = find("str::upper").expect("found");
        assert_eq!(upper.name, "upper");
        assert_eq!(upper.namespace, "str");
    }

    #[test]
    fn finds_piped_form() {
        assert_eq!(find("str:upper"), find("str::upper"));
    }

    #[test]
    fn finds_bare_name_in_any_namespace() {
        assert_eq!(find("upper"), find("str::upper"));
        assert!(find("default").is_some());
    }

    #[test]
    fn rejects_wrong_namespace_and_blank() {
        assert_eq!(find("num::upper"), None);
        assert_eq!(find(""), None);
        assert_eq!(find("   "), None);
    }

    #[test]
    fn namespace_listing() {
        let names: Vec<_> = in_namespace("num").map(|f| f.name).collect();
        assert_eq!(names, ["abs", "ceil", "floor", "round"]);
    }

    #[test]
    fn display_and_lookup_keys() {
        let join = find("coll::join").expect("found");
        assert_eq!(join.lookup_key(), "coll::join");
        assert_eq!(join.display_name(), "coll:join");
        let size = find("size").expect("found");
        assert_eq!(size.lookup_key(), "size");
        assert_eq!(size.display_name(), "size");
    }
}
