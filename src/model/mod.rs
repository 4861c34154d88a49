//! The resource model.
//!
//! A [`Resource`] is an immutable handle on one URL scope of the API. Nodes are
//! created top-down from a [`Restie`] client and keep a reference to the node
//! that created them, so [`Resource::parent`] walks back up the chain.
//!
//! ```text
//! api.item("planets", 3)         http://api/planets/3
//!    .parent()                   http://api/planets
//!    .parent()                   None
//! ```
//!
//! # Examples
//!
//! ```
//! use restie::Restie;
//!
//! let api = Restie::new("http://api");
//! let humans = api.item("planets", 3).collection("humans");
//! assert_eq!(humans.url(), "http://api/planets/3/humans");
//!
//! let planet = humans.parent().unwrap();
//! assert_eq!(planet.url(), "http://api/planets/3");
//! assert_eq!(planet.parent().unwrap().url(), "http://api/planets");
//! assert!(planet.parent().unwrap().parent().is_none());
//! ```

mod builder;

pub use builder::RequestBuilder;

use crate::client::Restie;
use crate::protocol::{concat_paths, normalize_leading_arg, path_from_value, PathSegment};
use crate::types::Method;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// Verbs available on every node, for positional calls through
/// [`Resource::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `get(path?, params?, headers?)`
    Get,
    /// `get_all(params?, headers?)`
    GetAll,
    /// `post(data?, params?, headers?)`
    Post,
    /// `put(path?, data?, params?, headers?)`
    Put,
    /// `patch(path?, data?, params?, headers?)`
    Patch,
    /// `delete(path?, data?, params?, headers?)`
    Delete,
}

impl Verb {
    fn takes_path(self) -> bool {
        matches!(self, Verb::Get | Verb::Put | Verb::Patch | Verb::Delete)
    }

    fn takes_data(self) -> bool {
        matches!(self, Verb::Post | Verb::Put | Verb::Patch | Verb::Delete)
    }
}

/// One URL scope of the API.
///
/// Cloning is cheap. Equality compares URLs; use [`Resource::same_node`] for
/// identity.
#[derive(Clone)]
pub struct Resource {
    node: Arc<Node>,
}

struct Node {
    client: Restie,
    url: String,
    parent: Option<Resource>,
}

impl Resource {
    pub(crate) fn root(client: Restie, name: PathSegment) -> Self {
        let url = concat_paths(&[client.base_url(), name.as_str()]);
        Self::new(client, url, None)
    }

    fn new(client: Restie, url: String, parent: Option<Resource>) -> Self {
        Resource {
            node: Arc::new(Node {
                client,
                url,
                parent,
            }),
        }
    }

    /// Full URL of this node.
    pub fn url(&self) -> &str {
        &self.node.url
    }

    /// The node this one was created from, or `None` at a root.
    pub fn parent(&self) -> Option<&Resource> {
        self.node.parent.as_ref()
    }

    /// The owning client.
    pub fn api(&self) -> &Restie {
        &self.node.client
    }

    /// Whether both handles refer to the very same node.
    pub fn same_node(&self, other: &Resource) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Child collection `url/name`.
    pub fn collection(&self, name: impl Into<PathSegment>) -> Resource {
        let name = name.into();
        let url = concat_paths(&[self.url(), name.as_str()]);
        Resource::new(self.node.client.clone(), url, Some(self.clone()))
    }

    /// Child item `url/name/id`.
    ///
    /// The item's parent is the `url/name` collection, not this node.
    pub fn item(&self, name: impl Into<PathSegment>, id: impl Into<PathSegment>) -> Resource {
        self.item_opt(name, Some(id))
    }

    /// Like [`Resource::item`], degrading to [`Resource::collection`] when
    /// `id` is absent or empty.
    pub fn item_opt<I: Into<PathSegment>>(
        &self,
        name: impl Into<PathSegment>,
        id: Option<I>,
    ) -> Resource {
        self.collection(name).item_child(id.map(Into::into))
    }

    pub(crate) fn item_child(self, id: Option<PathSegment>) -> Resource {
        match id.filter(|id| !id.is_empty()) {
            Some(id) => self.collection(id),
            None => self,
        }
    }

    fn request(&self, method: Method, data: Option<Value>) -> RequestBuilder {
        RequestBuilder::new(self.node.client.clone(), method, self.url(), data)
    }

    /// `GET` this node, or a sub-path of it with [`RequestBuilder::path`].
    pub fn get(&self) -> RequestBuilder {
        self.request(Method::Get, None)
    }

    /// `GET` this node.
    pub fn get_all(&self) -> RequestBuilder {
        self.request(Method::Get, None)
    }

    /// `POST` to this node. The body defaults to `{}`.
    pub fn post(&self) -> RequestBuilder {
        self.request(Method::Post, Some(json!({})))
    }

    /// `PUT` to this node. The body defaults to `{}`.
    pub fn put(&self) -> RequestBuilder {
        self.request(Method::Put, Some(json!({})))
    }

    /// `PATCH` this node. The body defaults to `{}`.
    pub fn patch(&self) -> RequestBuilder {
        self.request(Method::Patch, Some(json!({})))
    }

    /// `DELETE` this node. The body defaults to `{}`.
    pub fn delete(&self) -> RequestBuilder {
        self.request(Method::Delete, Some(json!({})))
    }

    /// Issue `verb` with positional arguments.
    ///
    /// Verbs taking a path accept it as an optional leading string or number;
    /// any other leading value shifts the arguments to data/params/headers.
    /// Missing trailing arguments take their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use restie::{Restie, Verb};
    /// use serde_json::json;
    ///
    /// let api = Restie::new("http://api");
    /// let options = api
    ///     .collection("users")
    ///     .call(Verb::Patch, vec![json!({"name": "ada"}), json!({"v": 2})])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(options.url, "http://api/users");
    /// assert_eq!(options.data, Some(json!({"name": "ada"})));
    /// assert_eq!(options.params["v"], json!(2));
    /// ```
    pub fn call(&self, verb: Verb, args: Vec<Value>) -> RequestBuilder {
        let (path, rest) = if verb.takes_path() {
            let mut args = normalize_leading_arg(args).into_iter();
            let path = args.next().as_ref().and_then(path_from_value);
            (path, args.collect::<Vec<_>>())
        } else {
            (None, args)
        };

        let mut builder = match verb {
            Verb::Get => self.get(),
            Verb::GetAll => self.get_all(),
            Verb::Post => self.post(),
            Verb::Put => self.put(),
            Verb::Patch => self.patch(),
            Verb::Delete => self.delete(),
        };
        if let Some(path) = path {
            builder = builder.path(path);
        }

        let mut rest = rest.into_iter();
        if verb.takes_data() {
            if let Some(data) = rest.next() {
                builder = builder.data(data);
            }
        }
        if let Some(params) = rest.next() {
            builder = builder.params_value(params);
        }
        if let Some(headers) = rest.next() {
            builder = builder.headers_value(headers);
        }
        builder
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.node.url == other.node.url
    }
}

impl Eq for Resource {}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.node.url)
            .field("parent", &self.parent().map(Resource::url))
            .finish()
    }
}
