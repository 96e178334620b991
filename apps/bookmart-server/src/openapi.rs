use utoipa::OpenApi;

/// Aggregated OpenAPI document for all mounted modules, served at
/// `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookmart API",
        description = "Online bookstore backend: catalog, carts and orders",
        version = "0.1.0",
    ),
    paths(
        catalog::api::rest::handlers::create_book,
        catalog::api::rest::handlers::get_book,
        catalog::api::rest::handlers::list_books,
        catalog::api::rest::handlers::search_books,
        catalog::api::rest::handlers::update_book,
        catalog::api::rest::handlers::delete_book,
        catalog::api::rest::handlers::delete_all_books,
        catalog::api::rest::handlers::create_category,
        catalog::api::rest::handlers::get_category,
        catalog::api::rest::handlers::list_categories,
        catalog::api::rest::handlers::update_category,
        catalog::api::rest::handlers::delete_category,
        catalog::api::rest::handlers::books_by_category,
        storefront::api::rest::handlers::get_cart,
        storefront::api::rest::handlers::add_cart_item,
        storefront::api::rest::handlers::update_cart_line,
        storefront::api::rest::handlers::remove_cart_line,
        storefront::api::rest::handlers::place_order,
        storefront::api::rest::handlers::list_orders,
        storefront::api::rest::handlers::order_lines,
        storefront::api::rest::handlers::order_line,
        storefront::api::rest::handlers::update_order_status,
    ),
    tags(
        (name = "catalog", description = "Books and categories"),
        (name = "storefront", description = "Carts and orders"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for expected in [
            "/books",
            "/books/search",
            "/books/{id}",
            "/categories",
            "/categories/{id}",
            "/categories/{id}/books",
            "/cart",
            "/cart/items/{id}",
            "/orders",
            "/orders/{id}",
            "/orders/{id}/items",
            "/orders/{id}/items/{item_id}",
        ] {
            assert!(paths.contains_key(expected), "missing path {expected}");
        }
    }
}
