//! # liteorm
//!
//! A minimal SQLite ORM for Rust.
//!
//! ## Features
//!
//! - **Explicit schemas**: declare columns and relations once, register, share the `Arc`
//! - **Statement builders**: SELECT / UPDATE / DELETE with one shared condition model
//! - **Safe defaults**: DELETE requires a condition, UPDATE requires an assignment
//! - **Fixed-shape records**: writing an attribute outside a record's columns is an error
//! - **Has-many relations**: loaded on request or eagerly, batched for lists
//! - **Tracing**: every statement is logged on the `liteorm.sql` target
//!
//! ## Query Builder (qb)
//!
//! ```
//! use liteorm::{qb, Op, Value};
//!
//! let q = qb::select("posts")
//!     .add_condition("id", Op::in_list(vec![1, 2]))
//!     .build()?;
//! assert_eq!(q.sql, "SELECT * FROM posts WHERE id IN (?1, ?2);");
//! assert_eq!(q.params, vec![Value::Integer(1), Value::Integer(2)]);
//!
//! let q = qb::delete("posts").eq("title", "Post 2").build()?;
//! assert_eq!(q.sql, "DELETE FROM posts WHERE title = ?1;");
//! # Ok::<(), liteorm::OrmError>(())
//! ```
//!
//! ## Persistence
//!
//! ```
//! use liteorm::{Dao, FieldDescriptor, RelationDescriptor, Schema};
//!
//! let posts = Schema::builder("Post", "posts")
//!     .field(FieldDescriptor::integer("id").primary_key())
//!     .field(FieldDescriptor::text("title"))
//!     .field(FieldDescriptor::integer("user_id").references("users"))
//!     .register()?;
//! let users = Schema::builder("User", "users")
//!     .field(FieldDescriptor::integer("id").primary_key())
//!     .field(FieldDescriptor::text("name").not_null())
//!     .relation(RelationDescriptor::has_many(&posts))
//!     .register()?;
//!
//! let dao = Dao::in_memory()?;
//! dao.create_table(&users)?;
//! dao.create_table(&posts)?;
//!
//! let mut user = users.new_record().with("name", "Ashwin")?;
//! let user_id = dao.insert(&users, &mut user)?;
//! let mut post = posts.new_record().with("title", "Post 1")?.with("user_id", user_id)?;
//! dao.insert(&posts, &mut post)?;
//!
//! let user = dao.get_by_id(&users, user_id, true)?.expect("inserted above");
//! assert_eq!(user.relation("posts").map(|posts| posts.len()), Some(1));
//! # Ok::<(), liteorm::OrmError>(())
//! ```

pub mod client;
pub mod condition;
pub mod config;
pub mod dao;
pub mod ddl;
pub mod error;
pub mod ident;
pub mod qb;
pub mod record;
pub mod relation;
pub mod schema;
pub mod value;

pub use client::{GenericClient, Row, SqliteClient};
pub use condition::{Condition, Filter, Op, Operator};
pub use config::DaoConfig;
pub use dao::Dao;
pub use error::{OrmError, OrmResult};
pub use record::Record;
pub use schema::{
    FieldDescriptor, ForeignKey, Member, RelationDescriptor, Schema, SchemaBuilder, StorageType,
};
pub use value::{FromValue, Value};

// Re-export qb module for easy access
pub use qb::{
    Assignments, BuiltQuery, DeleteQb, InsertQb, MutationQb, SelectQb, SqlQb, UpdateQb, delete,
    insert, select, update,
};
