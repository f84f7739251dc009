use super::*;
use crate::db::Storage;
use crate::db::models::{
    Category, PaymentInfoRequest, Product, ProductCreate, ShippingAddress,
};
use crate::db::repository::ProductRepository;
use rust_decimal::Decimal;

mod test_create;

struct TestContext {
    manager: OrdersManager,
    products: Arc<ProductRepository>,
}

fn create_test_manager() -> TestContext {
    let storage = Storage::open_in_memory().unwrap();
    let products = Arc::new(ProductRepository::new(storage.clone()));
    let manager = OrdersManager::new(
        OrderRepository::new(storage),
        products.clone(),
        PricingConfig::default(),
    );
    TestContext { manager, products }
}

impl TestContext {
    fn add_product(&self, name: &str, price: i64, stock: u32) -> Product {
        self.products
            .create(ProductCreate {
                name: name.to_string(),
                description: format!("{name} for tests"),
                price: Decimal::from(price),
                category: Category::Gifts,
                subcategory: "Mugs".to_string(),
                images: vec![],
                stock,
                discount: 0,
                tags: vec![],
                featured: false,
            })
            .unwrap()
    }

    fn stock_of(&self, product_id: &str) -> u32 {
        self.products.get_product(product_id).unwrap().stock
    }

    fn place(&self, actor: &Actor, items: &[(&str, u32)], method: PaymentMethod) -> Order {
        self.manager
            .create_order(actor, order_request(items, method))
            .unwrap()
    }
}

fn order_request(items: &[(&str, u32)], method: PaymentMethod) -> CreateOrderRequest {
    CreateOrderRequest {
        items: items
            .iter()
            .map(|(product, quantity)| OrderItemRequest {
                product: product.to_string(),
                quantity: *quantity,
            })
            .collect(),
        shipping_address: ShippingAddress {
            street: "12 Park Street".to_string(),
            city: "Kolkata".to_string(),
            state: "WB".to_string(),
            postal_code: "700016".to_string(),
            country: "India".to_string(),
        },
        payment_info: PaymentInfoRequest { method },
        notes: None,
    }
}

fn customer() -> Actor {
    Actor::customer("user-1")
}

fn other_customer() -> Actor {
    Actor::customer("user-2")
}

fn admin() -> Actor {
    Actor::admin("admin-1")
}
