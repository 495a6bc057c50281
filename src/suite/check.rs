//! Checks, categories and suites.
//!
//! A check body borrows the host mutably for the duration of its future, so
//! bodies are stored as higher-ranked boxed closures.

use super::outcome::Verdict;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Future returned by a check body.
pub type CheckFuture<'a, T> = LocalBoxFuture<'a, anyhow::Result<T>>;

/// A type-erased check body.
pub type CheckFn<H> = Box<dyn for<'a> Fn(&'a mut H) -> CheckFuture<'a, Verdict>>;

/// A type-erased suite setup step.
pub type SetupFn<H> = Box<dyn for<'a> Fn(&'a mut H) -> CheckFuture<'a, ()>>;

fn erase<H, F>(body: F) -> CheckFn<H>
where
    F: for<'a> Fn(&'a mut H) -> CheckFuture<'a, Verdict> + 'static,
{
    Box::new(body)
}

/// One named check.
pub struct Check<H> {
    name: String,
    run: CheckFn<H>,
}

impl<H: 'static> Check<H> {
    /// A check whose body reports a full verdict.
    pub fn verdict<F>(name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a mut H) -> CheckFuture<'a, Verdict> + 'static,
    {
        Self {
            name: name.into(),
            run: erase(body),
        }
    }

    /// A check whose body answers true (pass) or false (fail).
    pub fn boolean<F>(name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a mut H) -> CheckFuture<'a, bool> + 'static,
    {
        Self {
            name: name.into(),
            run: erase(move |host: &mut H| {
                let fut = body(host);
                async move { fut.await.map(Verdict::from) }.boxed_local()
            }),
        }
    }
}

impl<H> Check<H> {
    /// Check name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts the body against `host`.
    pub fn run<'a>(&self, host: &'a mut H) -> CheckFuture<'a, Verdict> {
        (self.run)(host)
    }
}

impl<H> std::fmt::Debug for Check<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

/// A named, ordered group of checks.
pub struct Category<H> {
    name: String,
    checks: Vec<Check<H>>,
}

impl<H: 'static> Category<H> {
    /// Creates an empty category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    /// Appends a check.
    pub fn check(mut self, check: Check<H>) -> Self {
        self.checks.push(check);
        self
    }

    /// Appends a boolean check.
    pub fn boolean<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a mut H) -> CheckFuture<'a, bool> + 'static,
    {
        self.check(Check::boolean(name, body))
    }

    /// Appends a verdict check.
    pub fn verdict<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a mut H) -> CheckFuture<'a, Verdict> + 'static,
    {
        self.check(Check::verdict(name, body))
    }
}

impl<H> Category<H> {
    /// Category name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks in declaration order.
    pub fn checks(&self) -> &[Check<H>] {
        &self.checks
    }
}

impl<H> std::fmt::Debug for Category<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.name)
            .field("checks", &self.checks)
            .finish()
    }
}

/// Which orchestrator flavour a suite follows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SuiteKind {
    /// Categorised behaviour checks with two-valued outcomes.
    Structured,
    /// Flat presence probes where warnings are allowed.
    AdHoc,
}

/// An ordered set of categories plus an optional setup step.
///
/// A setup failure aborts the run; a check failure never does.
pub struct Suite<H> {
    name: String,
    kind: SuiteKind,
    setup: Option<SetupFn<H>>,
    categories: Vec<Category<H>>,
}

impl<H: 'static> Suite<H> {
    /// Creates an empty suite.
    pub fn new(name: impl Into<String>, kind: SuiteKind) -> Self {
        Self {
            name: name.into(),
            kind,
            setup: None,
            categories: Vec::new(),
        }
    }

    /// Runs `setup` before the first check.
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: for<'a> Fn(&'a mut H) -> CheckFuture<'a, ()> + 'static,
    {
        self.setup = Some(Box::new(setup));
        self
    }

    /// Appends a category.
    pub fn category(mut self, category: Category<H>) -> Self {
        self.categories.push(category);
        self
    }
}

impl<H> Suite<H> {
    /// Suite name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suite flavour.
    pub fn kind(&self) -> SuiteKind {
        self.kind
    }

    /// The setup step, if any.
    pub fn setup(&self) -> Option<&SetupFn<H>> {
        self.setup.as_ref()
    }

    /// Categories in run order.
    pub fn categories(&self) -> &[Category<H>] {
        &self.categories
    }

    /// Total number of checks.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.checks.len()).sum()
    }

    /// Returns true when the suite has no checks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H> std::fmt::Debug for Suite<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("has_setup", &self.setup.is_some())
            .field("categories", &self.categories)
            .finish()
    }
}
