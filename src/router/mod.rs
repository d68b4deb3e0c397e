//! Application routes and navigation.

pub mod guard;
pub mod navigator;

pub use guard::{Step, Verdict};
pub use navigator::{Navigation, Navigator};

/// Access class declared by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without identity.
    Public,
    /// Reachable only with identity.
    RequiresAuth,
}

/// Route declaration, possibly with nested children.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub name: Option<&'static str>,
    pub path: &'static str,
    pub access: Option<Access>,
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    pub fn new(path: &'static str) -> Self {
        Self {
            name: None,
            path,
            access: None,
            children: Vec::new(),
        }
    }

    pub fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    pub fn children(mut self, children: Vec<RouteDef>) -> Self {
        self.children = children;
        self
    }
}

/// Resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: Option<&'static str>,
    pub path: String,
    /// Declared class, children inherit their parent's.
    pub declared: Option<Access>,
}

impl Route {
    /// Effective access class. Unmarked routes require authentication.
    pub fn access(&self) -> Access {
        self.declared.unwrap_or(Access::RequiresAuth)
    }
}

/// Flattened route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

fn join(parent: &str, child: &str) -> String {
    if child.is_empty() {
        normalize(parent)
    } else if child.starts_with('/') {
        normalize(child)
    } else {
        normalize(&format!("{}/{child}", parent.trim_end_matches('/')))
    }
}

impl RouteTable {
    pub fn new(definitions: Vec<RouteDef>) -> Self {
        let mut routes = Vec::new();
        for definition in &definitions {
            Self::flatten(definition, "/", None, &mut routes);
        }
        Self { routes }
    }

    fn flatten(
        definition: &RouteDef,
        parent_path: &str,
        inherited: Option<Access>,
        routes: &mut Vec<Route>,
    ) {
        let path = join(parent_path, definition.path);
        let declared = definition.access.or(inherited);

        // layouts without a name are not navigable by themselves.
        if definition.name.is_some() || definition.children.is_empty() {
            routes.push(Route {
                name: definition.name,
                path: path.clone(),
                declared,
            });
        }
        for child in &definition.children {
            Self::flatten(child, &path, declared, routes);
        }
    }

    /// Find the route for `path`; unknown paths get an unmarked route.
    pub fn resolve(&self, path: &str) -> Route {
        let path = normalize(path);
        self.routes
            .iter()
            .find(|route| route.path == path)
            .cloned()
            .unwrap_or(Route {
                name: None,
                path,
                declared: None,
            })
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

impl Default for RouteTable {
    /// Routes of the notas application.
    fn default() -> Self {
        Self::new(vec![
            RouteDef::new("/login").name("login").access(Access::Public),
            RouteDef::new("/")
                .access(Access::RequiresAuth)
                .children(vec![
                    RouteDef::new("").name("dashboard"),
                    RouteDef::new("notas").name("notas"),
                    RouteDef::new("notas/nueva").name("notas-nueva"),
                    RouteDef::new("notas/pendientes").name("notas-pendientes"),
                    RouteDef::new("notas/atrasadas").name("notas-atrasadas"),
                ]),
        ])
    }
}
