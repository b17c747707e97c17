//! Users, posts and tags on SQLite.
//!
//! Run with: cargo run --example app -p liteorm
//!
//! Set LITEORM_DATABASE in .env file or environment variable to use a file
//! (defaults to an in-memory database):
//! LITEORM_DATABASE=main.db
//!
//! Statements are logged with RUST_LOG=liteorm.sql=debug.

use liteorm::{
    Dao, DaoConfig, FieldDescriptor, OrmError, RelationDescriptor, Schema, qb,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct Models {
    users: Arc<Schema>,
    posts: Arc<Schema>,
    tags: Arc<Schema>,
}

fn models() -> Result<Models, OrmError> {
    let tags = Schema::builder("Tag", "tags")
        .field(FieldDescriptor::integer("id").primary_key())
        .field(FieldDescriptor::text("name"))
        .field(FieldDescriptor::integer("post_id").references("posts"))
        .register()?;

    let posts = Schema::builder("Post", "posts")
        .field(FieldDescriptor::integer("id").primary_key())
        .field(FieldDescriptor::text("title").unique())
        .field(FieldDescriptor::integer("user_id").references("users"))
        .relation(RelationDescriptor::has_many(&tags).eager())
        .register()?;

    let users = Schema::builder("User", "users")
        .field(FieldDescriptor::integer("id").primary_key())
        .field(FieldDescriptor::text("name").not_null().unique().default_value("Hai"))
        .relation(RelationDescriptor::has_many(&posts).eager())
        .register()?;

    Ok(Models { users, posts, tags })
}

fn print_users_and_posts(dao: &Dao, m: &Models, heading: &str) -> Result<(), OrmError> {
    println!("{heading}");
    for user in dao.fetch_all(&m.users, true)? {
        println!("> User: {}", user.get_as::<String>("name")?);
        for post in user.relation("posts").unwrap_or_default() {
            println!(">  Post: {}", post.get_as::<String>("title")?);
        }
    }
    Ok(())
}

fn main() -> Result<(), OrmError> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(true)
        .init();

    println!("App started");

    let config = DaoConfig::from_env();
    let dao = Dao::open(&config)?;
    let m = models()?;

    dao.create_table(&m.users)?;
    dao.create_table(&m.posts)?;
    dao.create_table(&m.tags)?;

    let mut ashwin = m.users.new_record().with("name", "Ashwin")?;
    dao.insert(&m.users, &mut ashwin)?;
    println!("Added user {}", ashwin.get_as::<String>("name")?);

    let mut kukku = m.users.new_record().with("name", "Kukku")?;
    dao.insert(&m.users, &mut kukku)?;
    println!("Added user {}", kukku.get_as::<String>("name")?);

    let ashwin_id = ashwin.get_as::<i64>("id")?;
    for title in ["Post 1", "Post 2"] {
        let mut post = m
            .posts
            .new_record()
            .with("title", title)?
            .with("user_id", ashwin_id)?;
        dao.insert(&m.posts, &mut post)?;
        println!("Added post {title}");
    }

    // Eager relations come along even without asking.
    if let Some(user) = dao.get_by_id(&m.users, 1, false)? {
        println!("Get user by id = 1; User: {}", user.get_as::<String>("name")?);
        println!("{}", user.to_json().expect("records serialize to JSON"));
    }

    let by_name = dao.select(&m.users).eq("name", "Kukku");
    let users = dao.fetch(&m.users, &by_name, true)?;
    if let Some(user) = users.first() {
        println!("Get user by name = Kukku; User: {}", user.get_as::<i64>("id")?);
    }

    print_users_and_posts(&dao, &m, "Get all users and posts")?;

    let by_names = qb::select(m.users.table()).in_list("name", vec!["Ashwin", "Kukku"]);
    println!("Get users by name = Ashwin AND Kukku");
    for user in dao.fetch(&m.users, &by_names, false)? {
        println!("> User: {}", user.get_as::<String>("name")?);
    }

    let update = dao
        .update_builder(&m.posts)
        .set("title", "Post Edited 1")
        .eq("title", "Post 1")
        .eq("id", 1);
    dao.execute(&update)?;
    print_users_and_posts(&dao, &m, "Get all users and posts after update")?;

    let delete = dao.delete_builder(&m.posts).eq("title", "Post 2");
    dao.execute(&delete)?;
    print_users_and_posts(&dao, &m, "Get all users and posts after delete")?;

    println!("App ended");
    Ok(())
}
