//! Sidebar navigation model.
//!
//! Two static menu groups, filtered per request by the session's role.
//! Entries marked admin-only disappear for cashiers; a group with no
//! surviving entries is dropped entirely rather than rendered empty.

/// One sidebar link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub title: &'static str,
    pub href: &'static str,
    pub admin_only: bool,
}

/// A labelled group of sidebar links.
#[derive(Debug, Clone, Copy)]
pub struct NavGroup {
    pub label: &'static str,
    pub entries: &'static [NavEntry],
}

/// A group after role filtering, ready for the template.
#[derive(Debug, Clone)]
pub struct VisibleNavGroup {
    pub label: &'static str,
    pub entries: Vec<NavEntry>,
}

const MAIN_MENU: NavGroup = NavGroup {
    label: "MAIN MENU",
    entries: &[
        NavEntry {
            title: "Dashboard",
            href: "/",
            admin_only: false,
        },
        NavEntry {
            title: "Suppliers",
            href: "/suppliers",
            admin_only: false,
        },
        NavEntry {
            title: "Customers",
            href: "/customers",
            admin_only: false,
        },
        NavEntry {
            title: "Products",
            href: "/products",
            admin_only: false,
        },
        NavEntry {
            title: "Transaction",
            href: "/transactions",
            admin_only: false,
        },
        NavEntry {
            title: "Reports",
            href: "/reports",
            admin_only: false,
        },
    ],
};

const SETTINGS: NavGroup = NavGroup {
    label: "SETTINGS",
    entries: &[
        NavEntry {
            title: "Users / Employees",
            href: "/users",
            admin_only: true,
        },
        NavEntry {
            title: "Configuration",
            href: "/configuration",
            admin_only: true,
        },
    ],
};

/// Entries visible to a session, in their original order.
#[must_use]
pub fn visible_entries(entries: &[NavEntry], is_admin: bool) -> Vec<NavEntry> {
    entries
        .iter()
        .filter(|entry| !entry.admin_only || is_admin)
        .copied()
        .collect()
}

/// The sidebar for a session: both groups filtered by role, with empty
/// groups removed.
#[must_use]
pub fn sidebar(is_admin: bool) -> Vec<VisibleNavGroup> {
    [MAIN_MENU, SETTINGS]
        .into_iter()
        .filter_map(|group| {
            let entries = visible_entries(group.entries, is_admin);
            (!entries.is_empty()).then_some(VisibleNavGroup {
                label: group.label,
                entries,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cashier_sees_only_unrestricted_entries_in_order() {
        let entries = visible_entries(MAIN_MENU.entries, false);
        let titles: Vec<&str> = entries.iter().map(|e| e.title).collect();
        assert_eq!(
            titles,
            ["Dashboard", "Suppliers", "Customers", "Products", "Transaction", "Reports"]
        );
    }

    #[test]
    fn test_admin_sees_every_entry_in_order() {
        let entries = visible_entries(SETTINGS.entries, true);
        let titles: Vec<&str> = entries.iter().map(|e| e.title).collect();
        assert_eq!(titles, ["Users / Employees", "Configuration"]);
    }

    #[test]
    fn test_empty_group_is_hidden_for_cashier() {
        let groups = sidebar(false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.first().map(|g| g.label), Some("MAIN MENU"));
    }

    #[test]
    fn test_admin_sidebar_keeps_both_groups() {
        let groups = sidebar(true);
        let labels: Vec<&str> = groups.iter().map(|g| g.label).collect();
        assert_eq!(labels, ["MAIN MENU", "SETTINGS"]);
    }
}
