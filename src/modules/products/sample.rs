use super::models::NewProduct;

/// The fixed catalogue installed by the sample seed, in insertion order.
pub fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Wireless Bluetooth Headphones".to_string(),
            description: "High-quality wireless headphones with active noise cancellation. Perfect for music lovers and professionals who need focus.".to_string(),
            price: 99.99,
            image: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=500&h=500&fit=crop".to_string(),
            category: "Electronics".to_string(),
            stock: 50,
        },
        NewProduct {
            name: "Smart Fitness Watch".to_string(),
            description: "Advanced smartwatch with heart rate monitoring, GPS, and 7-day battery life. Track your workouts and stay connected.".to_string(),
            price: 199.99,
            image: "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=500&h=500&fit=crop".to_string(),
            category: "Electronics".to_string(),
            stock: 30,
        },
        NewProduct {
            name: "Professional Running Shoes".to_string(),
            description: "Lightweight running shoes with superior cushioning and support. Designed for marathon runners and daily joggers.".to_string(),
            price: 79.99,
            image: "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=500&h=500&fit=crop".to_string(),
            category: "Sports".to_string(),
            stock: 100,
        },
        NewProduct {
            name: "Organic Cotton T-Shirt".to_string(),
            description: "Comfortable and sustainable organic cotton t-shirt. Available in multiple colors and sizes for everyday wear.".to_string(),
            price: 24.99,
            image: "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=500&h=500&fit=crop".to_string(),
            category: "Clothing".to_string(),
            stock: 200,
        },
        NewProduct {
            name: "Programming Fundamentals Book".to_string(),
            description: "Comprehensive guide to programming fundamentals. Perfect for beginners starting their coding journey.".to_string(),
            price: 39.99,
            image: "https://images.unsplash.com/photo-1544716278-ca5e3f4abd8c?w=500&h=500&fit=crop".to_string(),
            category: "Books".to_string(),
            stock: 75,
        },
        NewProduct {
            name: "Stainless Steel Water Bottle".to_string(),
            description: "Eco-friendly stainless steel water bottle that keeps drinks cold for 24 hours or hot for 12 hours.".to_string(),
            price: 29.99,
            image: "https://images.unsplash.com/photo-1602143407151-7111542de6e8?w=500&h=500&fit=crop".to_string(),
            category: "Home".to_string(),
            stock: 150,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_is_six_valid_products() {
        let products = sample_products();
        assert_eq!(products.len(), 6);
        assert!(products.iter().all(|p| p.validate().is_ok()));
        assert_eq!(products[0].name, "Wireless Bluetooth Headphones");
        assert_eq!(products[5].name, "Stainless Steel Water Bottle");
    }
}
