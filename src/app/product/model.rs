//! 产品数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 产品实体，`id` 与时间戳由存储层维护
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 可由客户端修改的产品字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, message = "产品名称不能为空"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "产品价格必须大于 0"))]
    pub price: f64,
    #[serde(default)]
    pub category: String,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// 创建产品请求
pub type CreateProductRequest = ProductInput;

/// 更新产品请求，与创建请求字段一致
pub type UpdateProductRequest = ProductInput;

/// 产品列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub count: usize,
}

impl From<Vec<Product>> for ProductList {
    fn from(products: Vec<Product>) -> Self {
        let count = products.len();
        Self { products, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_validation() {
        assert!(ProductInput::new("Pen", 1.5).validate().is_ok());
        assert!(ProductInput::new("", 1.5).validate().is_err());
        assert!(ProductInput::new("Pen", 0.0).validate().is_err());
        assert!(ProductInput::new("Pen", -3.0).validate().is_err());
    }

    #[test]
    fn test_input_optional_fields_default_to_empty() {
        let input: ProductInput = serde_json::from_str(r#"{"name":"Pen","price":1.5}"#).unwrap();
        assert_eq!(input.description, "");
        assert_eq!(input.category, "");
    }
}
