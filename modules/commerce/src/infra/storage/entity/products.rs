use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Catalog ids are assigned by the seed data, never by the database.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub category: Option<String>,
    pub stock: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Find a product by ID
pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).one(conn).await
}

/// List the whole catalog, ordered by name
pub async fn find_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Model>, DbErr> {
    Entity::find().order_by_asc(Column::Name).all(conn).await
}

/// Insert a full product row
pub async fn insert<C: ConnectionTrait>(conn: &C, product: Model) -> Result<Model, DbErr> {
    let active_model = ActiveModel {
        id: Set(product.id),
        name: Set(product.name),
        price: Set(product.price),
        image: Set(product.image),
        rating: Set(product.rating),
        review_count: Set(product.review_count),
        category: Set(product.category),
        stock: Set(product.stock),
    };

    active_model.insert(conn).await
}

/// Replace an existing product row by id (full-row point update)
pub async fn replace<C: ConnectionTrait>(conn: &C, product: Model) -> Result<Model, DbErr> {
    let active_model = ActiveModel {
        id: Set(product.id),
        name: Set(product.name),
        price: Set(product.price),
        image: Set(product.image),
        rating: Set(product.rating),
        review_count: Set(product.review_count),
        category: Set(product.category),
        stock: Set(product.stock),
    };

    active_model.update(conn).await
}

/// Decrement stock only if enough is available. The WHERE clause re-checks
/// `stock >= quantity`, so the returned flag tells whether the decrement
/// actually applied (false: unknown id or not enough stock).
pub async fn decrement_stock_guarded<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    quantity: i32,
) -> Result<bool, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).sub(quantity))
        .filter(Column::Id.eq(id))
        .filter(Column::Stock.gte(quantity))
        .exec(conn)
        .await?;

    Ok(result.rows_affected > 0)
}
