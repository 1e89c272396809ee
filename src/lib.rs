pub mod config;
pub mod graph;
pub mod model;
pub mod render;
pub mod search;
pub mod source;
pub mod sql;

use wasm_bindgen::prelude::*;

use config::Config;
use graph::Graph;
use model::{ModelError, Path};
use render::OutputFormat;
use search::PathFinder;
use source::{SchemaSource, SourceError};
use sql::{SqlParseError, SqlSchema};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SQL parse error: {0}")]
    Sql(#[from] SqlParseError),
    #[error("Schema error: {0}")]
    Source(#[from] SourceError),
    #[error("Path error: {0}")]
    Model(#[from] ModelError),
}

/// Shortest join paths between two tables of any schema source.
pub fn find_join_paths<S: SchemaSource>(
    source: &S,
    begin: &str,
    end: &str,
    finder: PathFinder,
) -> Result<Vec<Path>, Error> {
    let graph = Graph::from_foreign_keys(source.list_foreign_keys()?);
    search(source, &graph, begin, end, finder)
}

/// Shortest join paths between two tables declared in a SQL dump.
pub fn find_join_paths_in_sql(
    input: &str,
    begin: &str,
    end: &str,
    config: &Config,
) -> Result<Vec<Path>, Error> {
    let schema = SqlSchema::parse(input, config.dialect)?
        .with_default_schema(config.default_schema.clone());

    let foreign_keys = if config.skip_invalid {
        schema.list_foreign_keys_lenient()
    } else {
        schema.list_foreign_keys()?
    };
    let graph = Graph::from_foreign_keys(foreign_keys);

    search(&schema, &graph, begin, end, PathFinder::new(config.max_length))
}

fn search<S: SchemaSource>(
    source: &S,
    graph: &Graph,
    begin: &str,
    end: &str,
    finder: PathFinder,
) -> Result<Vec<Path>, Error> {
    let begin = source.resolve_table_name(begin)?;
    let end = source.resolve_table_name(end)?;

    for table in [&begin, &end] {
        if !graph.contains_table(table) {
            log::warn!("Table {} is not part of any foreign key", table);
        }
    }

    Ok(finder.find_paths(graph, &begin, &end)?)
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Find join paths in a SQL dump and render them as text.
///
/// Returns an empty string when the tables are not connected.
#[wasm_bindgen(js_name = "findJoinPaths")]
pub fn find_join_paths_js(
    sql: &str,
    begin: &str,
    end: &str,
    format: Option<String>,
) -> Result<String, String> {
    let format = match format.as_deref() {
        Some(f) => OutputFormat::from_str(f).ok_or_else(|| format!("Invalid format: {}", f))?,
        None => OutputFormat::default(),
    };

    let paths = find_join_paths_in_sql(sql, begin, end, &Config::default())
        .map_err(|e| e.to_string())?;

    Ok(render::render_all(&paths, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP: &str = r#"
        -- PostgreSQL database dump
        CREATE TABLE public.customers (
            id integer PRIMARY KEY
        );
        CREATE TABLE public.orders (
            id integer PRIMARY KEY,
            customer_id integer NOT NULL
        );
        CREATE TABLE public.order_items (
            order_id integer NOT NULL,
            line_no integer NOT NULL
        );
        ALTER TABLE ONLY public.orders
            ADD CONSTRAINT orders_customer_fkey FOREIGN KEY (customer_id) REFERENCES public.customers(id);
        ALTER TABLE ONLY public.order_items
            ADD CONSTRAINT order_items_order_fkey FOREIGN KEY (order_id) REFERENCES public.orders(id);
    "#;

    #[test]
    fn test_sql_end_to_end_joins() {
        let paths = find_join_paths_in_sql(SHOP, "order_items", "customers", &Config::default()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(
            render::render_joins(&paths[0]),
            "public.order_items\n\
             JOIN public.orders ON public.order_items.order_id = public.orders.id\n\
             JOIN public.customers ON public.orders.customer_id = public.customers.id"
        );
    }

    #[test]
    fn test_generic_source() {
        let schema = SqlSchema::parse(SHOP, sql::Dialect::Auto).unwrap();
        let paths = find_join_paths(&schema, "public.customers", "order_items", PathFinder::default()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 2);
    }

    #[test]
    fn test_unconnected_is_empty_not_error() {
        let paths = find_join_paths_in_sql(SHOP, "customers", "invoices", &Config::default()).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_skip_invalid() {
        let sql = r#"
            CREATE TABLE parent (a INT, b INT);
            CREATE TABLE child (
                x INT,
                parent_id INT REFERENCES parent(a),
                FOREIGN KEY (x) REFERENCES parent(a, b)
            );
        "#;
        let strict = find_join_paths_in_sql(sql, "child", "parent", &Config::default());
        assert!(matches!(strict, Err(Error::Source(SourceError::InvalidForeignKey { .. }))));

        let config = Config {
            skip_invalid: true,
            ..Config::default()
        };
        let paths = find_join_paths_in_sql(sql, "child", "parent", &config).unwrap();
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_table_names_are_case_insensitive_unless_quoted() {
        let sql = r#"
            CREATE TABLE Parent (id INT PRIMARY KEY);
            CREATE TABLE child (parent_id INT REFERENCES parent(id));
        "#;
        let paths = find_join_paths_in_sql(sql, "child", "Parent", &Config::default()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].to_string(), "child(parent_id) -> parent(id)");

        let quoted = find_join_paths_in_sql(sql, "child", "\"Parent\"", &Config::default()).unwrap();
        assert!(quoted.is_empty());
    }

    #[test]
    fn test_js_entry_point() {
        let out = find_join_paths_js(SHOP, "orders", "customers", Some("trace".to_string())).unwrap();
        assert_eq!(out, "public.orders(customer_id) -> public.customers(id)");
        assert!(find_join_paths_js(SHOP, "orders", "customers", Some("svg".to_string())).is_err());
    }
}
