use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a new order header
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    order_date: DateTime<Utc>,
    total_price: Decimal,
) -> Result<Model, DbErr> {
    let active_model = ActiveModel {
        user_id: Set(user_id),
        order_date: Set(order_date),
        total_price: Set(total_price),
        ..Default::default()
    };

    active_model.insert(conn).await
}

/// Order history for one user, newest first
pub async fn find_for_user_newest_first<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::OrderDate)
        .order_by_desc(Column::Id)
        .all(conn)
        .await
}
