use crate::contract::model::{OrderSummary, Product, User};
use crate::infra::storage::entity::{orders, products, users};

/// Convert a product entity to a contract model
pub fn product_to_contract(entity: products::Model) -> Product {
    Product {
        id: entity.id,
        name: entity.name,
        price: entity.price,
        image: entity.image,
        rating: entity.rating,
        review_count: entity.review_count,
        category: entity.category,
        stock: entity.stock,
    }
}

/// Convert a contract product to a full entity row
pub fn product_to_entity(product: Product) -> products::Model {
    products::Model {
        id: product.id,
        name: product.name,
        price: product.price,
        image: product.image,
        rating: product.rating,
        review_count: product.review_count,
        category: product.category,
        stock: product.stock,
    }
}

/// Convert a user entity to a contract model; the hash stays behind
pub fn user_to_contract(entity: users::Model) -> User {
    User {
        id: entity.id,
        name: entity.name,
        email: entity.email,
    }
}

/// Convert an order entity to a history line
pub fn order_to_summary(entity: orders::Model) -> OrderSummary {
    OrderSummary {
        id: entity.id,
        order_date: entity.order_date,
        total_price: entity.total_price,
    }
}
