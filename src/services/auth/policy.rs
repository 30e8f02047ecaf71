//! Route-level authorization.
//!
//! A first-match table maps path patterns to rules; `decide` turns a rule, the
//! optional principal and the resolved owner into a permit/deny. Nothing here
//! caches or mutates: the only I/O is the ownership lookup in `evaluate`.
use tracing::warn;

use crate::services::auth::lookup::ResourceOwnerLookup;
use crate::services::auth::principal::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    Public,
    AdminOnly,
    /// Admins, or the principal owning the resource named by path variable `param`.
    OwnerOrAdmin { param: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny,
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Var(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

/// Path variables captured by a matched pattern.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PathVars<'p>(Vec<(&'static str, &'p str)>);

impl<'p> PathVars<'p> {
    pub fn get(&self, name: &str) -> Option<&'p str> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl RoutePattern {
    /// `{name}` captures exactly one segment; everything else matches literally.
    pub fn parse(pattern: &'static str) -> Self {
        let segments = segments(pattern)
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Var(name),
                None => Segment::Literal(s),
            })
            .collect();
        Self { segments }
    }

    pub fn matches<'p>(&self, path: &'p str) -> Option<PathVars<'p>> {
        let mut vars = Vec::new();
        let mut parts = segments(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if *lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Var(name) => vars.push((*name, part)),
            }
        }

        match parts.next() {
            Some(_) => None,
            None => Some(PathVars(vars)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    routes: Vec<(RoutePattern, AccessRule)>,
    fallback: AccessRule,
}

impl AccessPolicy {
    pub fn new(routes: Vec<(&'static str, AccessRule)>, fallback: AccessRule) -> Self {
        let routes = routes
            .into_iter()
            .map(|(pattern, rule)| (RoutePattern::parse(pattern), rule))
            .collect();
        Self { routes, fallback }
    }

    /// Rules for the `/api/v1` surface. Unlisted paths fall through to `Public`.
    pub fn travellers() -> Self {
        const OWNER: AccessRule = AccessRule::OwnerOrAdmin {
            param: "traveller_id",
        };

        Self::new(
            vec![
                ("/api/v1/travellers/save", AccessRule::Public),
                ("/api/v1/auth/authenticate", AccessRule::Public),
                ("/api/v1/travellers/all/paginated", AccessRule::AdminOnly),
                ("/api/v1/travellers/{traveller_id}/add", OWNER),
                (
                    "/api/v1/travellers/{traveller_id}/remove-country/{country_id}",
                    OWNER,
                ),
                (
                    "/api/v1/travellers/{traveller_id}/total-travelled-countries",
                    OWNER,
                ),
                (
                    "/api/v1/travellers/{traveller_id}/total-untravelled-countries",
                    OWNER,
                ),
                (
                    "/api/v1/travellers/{traveller_id}/deactivate",
                    AccessRule::AdminOnly,
                ),
                (
                    "/api/v1/travellers/{traveller_id}/restore",
                    AccessRule::AdminOnly,
                ),
                (
                    "/api/v1/travellers/{traveller_id}/delete",
                    AccessRule::AdminOnly,
                ),
                ("/api/v1/travellers/{traveller_id}", OWNER),
                ("/api/v1/travellers", AccessRule::AdminOnly),
            ],
            AccessRule::Public,
        )
    }

    pub fn rule_for<'p>(&self, path: &'p str) -> (AccessRule, PathVars<'p>) {
        self.routes
            .iter()
            .find_map(|(pattern, rule)| pattern.matches(path).map(|vars| (*rule, vars)))
            .unwrap_or((self.fallback, PathVars::default()))
    }

    pub async fn evaluate(
        &self,
        path: &str,
        principal: Option<&Principal>,
        owners: &dyn ResourceOwnerLookup,
    ) -> Decision {
        let (rule, vars) = self.rule_for(path);

        let owner = match (rule, principal) {
            (AccessRule::OwnerOrAdmin { param }, Some(p)) if !p.is_admin() => {
                resolve_owner(vars.get(param), owners).await
            }
            _ => None,
        };

        decide(rule, principal, owner.as_deref())
    }
}

async fn resolve_owner(raw_id: Option<&str>, owners: &dyn ResourceOwnerLookup) -> Option<String> {
    let id = raw_id?.parse::<i64>().ok()?;
    match owners.find_owner(id).await {
        Ok(owner) => owner,
        Err(err) => {
            warn!(error = ?err, resource_id = id, "ownership lookup failed");
            None
        }
    }
}

/// `owner` is the resolved owning username; `None` means it did not resolve.
pub fn decide(rule: AccessRule, principal: Option<&Principal>, owner: Option<&str>) -> Decision {
    let permitted = match rule {
        AccessRule::Public => true,
        AccessRule::AdminOnly => principal.is_some_and(Principal::is_admin),
        AccessRule::OwnerOrAdmin { .. } => match principal {
            None => false,
            Some(p) if p.is_admin() => true,
            Some(p) => owner == Some(p.subject.as_str()),
        },
    };

    if permitted {
        Decision::Permit
    } else {
        Decision::Deny
    }
}
