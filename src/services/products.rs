use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::product::{
    Product, ProductCreateRequest, ProductFilterQuery, ProductPage, ProductSearchQuery,
    ProductUpdateRequest,
};
use crate::models::PageQuery;

pub async fn create(pool: &PgPool, req: &ProductCreateRequest) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, category, stock, images)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(&req.category)
    .bind(req.stock)
    .bind(&req.images)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    name_query: Option<&'a str>,
    filter: &'a ProductFilterQuery,
) {
    let mut clause = " WHERE ";
    let mut push_and = |builder: &mut QueryBuilder<'a, Postgres>| {
        builder.push(clause);
        clause = " AND ";
    };
    if let Some(query) = name_query {
        push_and(builder);
        builder.push("name ILIKE ").push_bind(format!("%{query}%"));
    }
    if let Some(category) = &filter.category {
        push_and(builder);
        builder.push("category = ").push_bind(category);
    }
    if let Some(min) = filter.min_price {
        push_and(builder);
        builder.push("price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        push_and(builder);
        builder.push("price <= ").push_bind(max);
    }
}

/// Paginated list with optional category/price-range filter. `total_count`
/// matches the filter, independent of page and limit.
pub async fn list(
    pool: &PgPool,
    page: &PageQuery,
    filter: &ProductFilterQuery,
) -> Result<ProductPage, AppError> {
    let mut query = QueryBuilder::new("SELECT * FROM products");
    push_filters(&mut query, None, filter);
    query
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let products = query.build_query_as::<Product>().fetch_all(pool).await?;

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_filters(&mut count, None, filter);
    let total_count: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok(ProductPage {
        products,
        total_count,
    })
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Product>, AppError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

/// Partial update; returns the new row, or None when the id has no match.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &ProductUpdateRequest,
) -> Result<Option<Product>, AppError> {
    let mut query = QueryBuilder::new("UPDATE products SET updated_at = NOW()");
    if let Some(name) = &req.name {
        query.push(", name = ").push_bind(name);
    }
    if let Some(description) = &req.description {
        query.push(", description = ").push_bind(description);
    }
    if let Some(price) = req.price {
        query.push(", price = ").push_bind(price);
    }
    if let Some(category) = &req.category {
        query.push(", category = ").push_bind(category);
    }
    if let Some(stock) = req.stock {
        query.push(", stock = ").push_bind(stock);
    }
    if let Some(images) = &req.images {
        query.push(", images = ").push_bind(images);
    }
    query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

    let product = query
        .build_query_as::<Product>()
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

/// Idempotent: deleting an absent product still succeeds.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Substring search across name, plus the optional category/price filter.
pub async fn search(pool: &PgPool, q: &ProductSearchQuery) -> Result<Vec<Product>, AppError> {
    let filter = ProductFilterQuery {
        category: q.category.clone(),
        min_price: q.min_price,
        max_price: q.max_price,
    };
    let mut query = QueryBuilder::new("SELECT * FROM products");
    push_filters(&mut query, q.query.as_deref(), &filter);
    query.push(" ORDER BY name");
    let products = query.build_query_as::<Product>().fetch_all(pool).await?;
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(name_query: Option<&str>, filter: &ProductFilterQuery) -> String {
        let mut builder = QueryBuilder::new("SELECT * FROM products");
        push_filters(&mut builder, name_query, filter);
        builder.sql().to_string()
    }

    #[test]
    fn no_filters_means_no_where_clause() {
        let sql = sql_for(None, &ProductFilterQuery::default());
        assert_eq!(sql, "SELECT * FROM products");
    }

    #[test]
    fn filters_combine_with_and() {
        let filter = ProductFilterQuery {
            category: Some("furniture".into()),
            min_price: Some(10.0),
            max_price: Some(100.0),
        };
        let sql = sql_for(None, &filter);
        assert!(sql.contains("WHERE category = $1"));
        assert!(sql.contains("AND price >= $2"));
        assert!(sql.contains("AND price <= $3"));
    }

    #[test]
    fn search_prepends_name_match() {
        let sql = sql_for(Some("desk"), &ProductFilterQuery::default());
        assert!(sql.contains("WHERE name ILIKE $1"));
    }

    fn sample_product(category: &str, n: usize) -> ProductCreateRequest {
        ProductCreateRequest {
            name: format!("Walnut desk {n}"),
            description: "Solid walnut standing desk, 140x70cm".into(),
            price: 499.99,
            category: category.into(),
            stock: 12,
            images: vec!["https://cdn.example.com/desk.jpg".into()],
        }
    }

    // The database tests below skip when DATABASE_URL is unset.

    #[tokio::test]
    async fn total_count_ignores_page_and_limit() {
        let Some(pool) = crate::services::test_db::pool().await else {
            return;
        };
        let category = format!("cat-{}", Uuid::new_v4());
        for n in 0..3 {
            create(&pool, &sample_product(&category, n)).await.unwrap();
        }

        let filter = ProductFilterQuery {
            category: Some(category),
            min_price: None,
            max_price: None,
        };
        let first = list(
            &pool,
            &PageQuery {
                page: Some(1),
                limit: Some(1),
            },
            &filter,
        )
        .await
        .unwrap();
        let third = list(
            &pool,
            &PageQuery {
                page: Some(3),
                limit: Some(1),
            },
            &filter,
        )
        .await
        .unwrap();

        assert_eq!(first.products.len(), 1);
        assert_eq!(first.total_count, 3);
        assert_eq!(third.total_count, 3);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let Some(pool) = crate::services::test_db::pool().await else {
            return;
        };
        let category = format!("cat-{}", Uuid::new_v4());
        let product = create(&pool, &sample_product(&category, 0)).await.unwrap();

        delete(&pool, product.id).await.unwrap();
        assert!(get(&pool, product.id).await.unwrap().is_none());

        // Absent and never-existed ids still succeed.
        delete(&pool, product.id).await.unwrap();
        delete(&pool, Uuid::new_v4()).await.unwrap();
    }
}
