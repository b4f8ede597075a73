//! DDL for the benchmark databases.

use crate::error::MySQLBenchError;
use loadtest_engine::Entity;

const MAX_IDENTIFIER_LEN: usize = 64;

const CREATE_USERS: &str = "CREATE TABLE users (
    id INT AUTO_INCREMENT PRIMARY KEY,
    username VARCHAR(50) NOT NULL,
    email VARCHAR(100) NOT NULL,
    first_name VARCHAR(50),
    last_name VARCHAR(50),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    status ENUM('active', 'inactive', 'suspended') DEFAULT 'active',
    INDEX idx_email (email),
    INDEX idx_status (status)
)";

const CREATE_PRODUCTS: &str = "CREATE TABLE products (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    price DECIMAL(10,2) NOT NULL,
    category VARCHAR(50),
    stock INT DEFAULT 0,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    INDEX idx_category (category),
    INDEX idx_price (price)
)";

const CREATE_ORDERS: &str = "CREATE TABLE orders (
    id INT AUTO_INCREMENT PRIMARY KEY,
    user_id INT NOT NULL,
    order_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    status ENUM('pending', 'processing', 'shipped', 'delivered', 'cancelled') DEFAULT 'pending',
    total_amount DECIMAL(10,2) NOT NULL,
    shipping_address TEXT,
    payment_method VARCHAR(50),
    INDEX idx_user_id (user_id),
    INDEX idx_status (status),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
)";

const CREATE_ORDER_ITEMS: &str = "CREATE TABLE order_items (
    id INT AUTO_INCREMENT PRIMARY KEY,
    order_id INT NOT NULL,
    product_id INT NOT NULL,
    quantity INT NOT NULL DEFAULT 1,
    price DECIMAL(10,2) NOT NULL,
    INDEX idx_order_id (order_id),
    INDEX idx_product_id (product_id),
    FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE CASCADE,
    FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
)";

/// `CREATE TABLE` statement for `entity`.
pub fn create_table(entity: Entity) -> &'static str {
    match entity {
        Entity::Users => CREATE_USERS,
        Entity::Products => CREATE_PRODUCTS,
        Entity::Orders => CREATE_ORDERS,
        Entity::OrderItems => CREATE_ORDER_ITEMS,
    }
}

/// Tables in an order that satisfies every foreign key.
pub const CREATION_ORDER: [Entity; 4] = [
    Entity::Users,
    Entity::Products,
    Entity::Orders,
    Entity::OrderItems,
];

/// Quote `name` for use as a database identifier.
///
/// Identifiers cannot be bound as parameters, so only plain names are
/// accepted.
pub fn quote_identifier(name: &str) -> Result<String, MySQLBenchError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid {
        return Err(MySQLBenchError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{name}`"))
}

pub fn drop_database(name: &str) -> Result<String, MySQLBenchError> {
    Ok(format!("DROP DATABASE IF EXISTS {}", quote_identifier(name)?))
}

pub fn create_database(name: &str) -> Result<String, MySQLBenchError> {
    Ok(format!("CREATE DATABASE {}", quote_identifier(name)?))
}

pub fn use_database(name: &str) -> Result<String, MySQLBenchError> {
    Ok(format!("USE {}", quote_identifier(name)?))
}
