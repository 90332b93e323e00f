pub mod soundtrack;
