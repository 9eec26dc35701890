//! Property-based tests for source descriptor resolution.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::defaults::DEFAULT_COMPONENT_NAME;
    use crate::source::{derive_name, resolve};
    use proptest::prelude::*;

    // ============================================================================
    // resolve property tests
    // ============================================================================

    proptest! {
        /// Property: resolve never panics and always yields a VCS type
        #[test]
        fn resolve_never_panics(input in ".*") {
            let resolved = resolve(&input);
            prop_assert!(!resolved.vcs_type.is_empty());
        }

        /// Property: resolve is deterministic (same input = same output)
        #[test]
        fn resolve_is_deterministic(input in ".*") {
            prop_assert_eq!(resolve(&input), resolve(&input));
        }

        /// Property: re-resolving a recognized URL leaves it unchanged
        #[test]
        fn resolve_is_idempotent_for_urls(
            scheme in "(git|https|http|ssh)",
            host in "[a-zA-Z]{1,10}\\.(com|org|io|COM)",
            path in "(/[a-zA-Z0-9_-]{1,12}(/[a-zA-Z0-9_-]{1,12}){0,2}(\\.git)?)?",
            version in "(v?[0-9]\\.[0-9]{1,2}\\.[0-9]{1,2})?",
        ) {
            let source = if version.is_empty() {
                format!("{}://{}{}", scheme, host, path)
            } else {
                format!("{}://{}{}?version={}", scheme, host, path, version)
            };
            let once = resolve(&source);
            let twice = resolve(&once.url);
            prop_assert_eq!(&once.url, &twice.url);
            prop_assert!(!once.url.contains('?'));
            prop_assert!(!once.url.starts_with("git://"));
            prop_assert_eq!(once.version, version);
        }

        /// Property: SCP-like sources keep everything before the query string
        #[test]
        fn resolve_scp_strips_only_query(
            user in "[a-z]{1,8}",
            host in "[a-z]{1,10}\\.(com|xz)",
            path in "[a-z0-9_-]{1,12}(/[a-z0-9_-]{1,12}){0,2}(\\.git)?",
            version in "v[0-9]\\.[0-9]\\.[0-9]",
        ) {
            let base = format!("{}@{}:{}", user, host, path);
            let resolved = resolve(&format!("{}?version={}", base, version));
            prop_assert_eq!(resolved.url, base);
            prop_assert_eq!(resolved.version, version);
        }

        /// Property: local paths and other schemes only lose their query string
        #[test]
        fn resolve_strips_query_from_other_forms(
            base in "(/srv/|\\.\\./|ftp://example\\.com/)[a-z0-9_-]{1,12}(\\.git)?",
            version in "v[0-9]\\.[0-9]\\.[0-9]",
        ) {
            let resolved = resolve(&format!("{}?version={}", base, version));
            prop_assert_eq!(&resolved.url, &base);
            prop_assert_eq!(resolved.version, version);
            prop_assert_eq!(resolve(&resolved.url).url, base);
        }

        /// Property: anything without a recognized shape passes through untouched
        #[test]
        fn resolve_passes_through_plain_words(input in "[a-zA-Z0-9 _.-]*") {
            let resolved = resolve(&input);
            prop_assert_eq!(resolved.url, input);
            prop_assert!(resolved.version.is_empty());
        }
    }

    // ============================================================================
    // derive_name property tests
    // ============================================================================

    proptest! {
        /// Property: derive_name never returns an empty string or a separator
        #[test]
        fn derive_name_is_never_empty(input in ".*") {
            let name = derive_name(&input);
            prop_assert!(!name.is_empty());
            prop_assert!(!name.contains('/'));
            prop_assert!(!name.contains('\\'));
        }

        /// Property: derive_name is deterministic
        #[test]
        fn derive_name_is_deterministic(input in ".*") {
            prop_assert_eq!(derive_name(&input), derive_name(&input));
        }

        /// Property: the final path segment is recovered regardless of form
        #[test]
        fn derive_name_recovers_last_segment(
            prefix in "(https://github\\.com/org/|git@github\\.com:org/|/srv/repos/|\\.\\./)",
            name in "[a-z][a-z0-9_-]{0,15}",
            suffix in "(\\.git)?/?",
        ) {
            let input = format!("{}{}{}", prefix, name, suffix);
            prop_assert_eq!(derive_name(&input), name);
        }

        /// Property: a trailing .git alone never becomes a name
        #[test]
        fn derive_name_bare_dot_git_uses_placeholder(prefix in "(https://example\\.com/|git@host\\.xz:|)") {
            let input = format!("{}.git", prefix);
            prop_assert_eq!(derive_name(&input), DEFAULT_COMPONENT_NAME);
        }
    }
}
