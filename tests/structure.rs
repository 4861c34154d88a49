use restie::{Resource, Restie};

fn api() -> Restie {
    // Nothing is sent, any base URL works.
    Restie::new("http://0.0.0.0:3000")
}

fn path_of(resource: &Resource) -> &str {
    resource
        .url()
        .strip_prefix("http://0.0.0.0:3000")
        .unwrap_or(resource.url())
}

#[test]
fn test_models_initialize_as_nested_pathways() {
    let api = api();

    let households = api.collection("households");
    assert_eq!(path_of(&households), "/households");

    let children = api.item("households", 123456).collection("children");
    assert_eq!(path_of(&children), "/households/123456/children");

    let toys = children.collection("sam").collection("toys");
    assert_eq!(path_of(&toys), "/households/123456/children/sam/toys");
}

#[test]
fn test_traverse_up_complex_parent_tree() {
    let api = api();

    let bananas = api
        .item("solar-systems", "home")
        .item("planets", "earth")
        .collection("monkeys")
        .collection("andy")
        .collection("bananas");

    let expected = [
        "/solar-systems/home/planets/earth/monkeys/andy",
        "/solar-systems/home/planets/earth/monkeys",
        "/solar-systems/home/planets/earth",
        "/solar-systems/home/planets",
        "/solar-systems/home",
        "/solar-systems",
    ];

    let mut visited = Vec::new();
    let mut current = bananas.parent();
    while let Some(node) = current {
        visited.push(path_of(node).to_string());
        assert_eq!(node.api(), &api);
        current = node.parent();
    }

    assert_eq!(visited, expected);
}

#[test]
fn test_item_without_id_matches_collection() {
    let api = api();
    let root = api.collection("zoo");

    let with_none = root.item_opt("animals", None::<u64>);
    let with_empty = root.item_opt("animals", Some(""));
    let collection = root.collection("animals");

    assert_eq!(with_none, collection);
    assert_eq!(with_empty, collection);
    assert_eq!(with_none.parent(), collection.parent());
    assert_eq!(with_none.collection("x").url(), collection.collection("x").url());
}

#[test]
fn test_url_is_concatenation_of_segments() {
    let api = api();
    let node = api
        .collection("/a")
        .item("b", 1)
        .collection("c")
        .item("/d", "e");
    assert_eq!(node.url(), "http://0.0.0.0:3000/a/b/1/c/d/e");
}

#[test]
fn test_custom_is_collection() {
    let api = api();
    assert_eq!(api.custom("raw"), api.collection("raw"));
    assert_eq!(api.url(), "http://0.0.0.0:3000");
}

#[test]
fn test_nodes_are_distinct_handles() {
    let api = api();
    let a = api.collection("a");
    let b = api.collection("a");
    assert_eq!(a, b);
    assert!(!a.same_node(&b));
    assert!(a.same_node(&a.clone()));
}
