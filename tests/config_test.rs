use std::io::Write;

use nocturne_links::{Config, Exception, PageId, ParameterMap, RouteTable};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_table_from_config_file() {
    let file = write_config(
        r#"
        context_path = "/blog/"

        [[route]]
        page = "bloggy.IndexPage"
        patterns = ["", "page/{pageIndex}"]

        [[route]]
        page = "bloggy.UserPage"
        patterns = ["profile/{userName:Mike,Max};profiles/all"]
        name = "user"
        "#,
    );
    let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
    let table = RouteTable::from_config(&config).unwrap();

    assert_eq!(table.context_path(), "/blog");
    assert_eq!(table.routes().len(), 2);
    assert_eq!(
        table.link_named_pairs("user", ["userName", "Mike"]).unwrap(),
        "/blog/profile/Mike"
    );
    let result = table.match_uri("/blog/page/5").unwrap().unwrap();
    assert_eq!(result.page(), &PageId::new("bloggy.IndexPage"));
    assert_eq!(result.attribute("pageIndex"), Some("5"));
    assert_eq!(
        table
            .link(&PageId::new("bloggy.IndexPage"), &ParameterMap::new())
            .unwrap(),
        "/blog/"
    );
}

#[test]
fn test_config_with_malformed_pattern() {
    let file = write_config(
        r#"
        [[route]]
        page = "bloggy.IndexPage"
        patterns = ["/page/{pageIndex}"]
        "#,
    );
    let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
    match RouteTable::from_config(&config) {
        Err(Exception::Configuration(msg)) => assert!(msg.contains("/page/{pageIndex}")),
        Err(other) => panic!("Expected Configuration error, got {:?}", other),
        Ok(_) => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_config_with_empty_route() {
    let file = write_config(
        r#"
        [[route]]
        page = "bloggy.IndexPage"
        patterns = []
        "#,
    );
    let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
    assert!(matches!(
        RouteTable::from_config(&config),
        Err(Exception::Configuration(_))
    ));
}

#[test]
fn test_config_disables_cache() {
    let file = write_config(
        r#"
        match_cache_size = 0

        [[route]]
        page = "bloggy.LoginPage"
        patterns = ["login"]
        "#,
    );
    let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.match_cache_size(), 0);
    let table = RouteTable::from_config(&config).unwrap();
    assert!(table.match_path("/login").unwrap().is_some());
}

#[test]
fn test_bundled_routes_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/routes.toml");
    let config = Config::from_toml(path).unwrap();
    let table = RouteTable::from_config(&config).unwrap();
    assert_eq!(
        table.link_named_pairs("post", ["postId", "7", "slug", "hello"]).unwrap(),
        "/post/7/hello"
    );
}
