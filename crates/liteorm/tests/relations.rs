use liteorm::{Dao, FieldDescriptor, Filter, Record, RelationDescriptor, Schema};
use std::sync::Arc;

struct Blog {
    dao: Dao,
    users: Arc<Schema>,
    posts: Arc<Schema>,
}

fn blog(eager: bool) -> Blog {
    let posts = Schema::builder("Post", "posts")
        .field(FieldDescriptor::integer("id").primary_key())
        .field(FieldDescriptor::text("title").unique())
        .field(FieldDescriptor::integer("user_id").references("users"))
        .register()
        .unwrap();

    let mut relation = RelationDescriptor::has_many(&posts);
    if eager {
        relation = relation.eager();
    }
    let users = Schema::builder("User", "users")
        .field(FieldDescriptor::integer("id").primary_key())
        .field(FieldDescriptor::text("name").not_null())
        .relation(relation)
        .register()
        .unwrap();

    let dao = Dao::in_memory().unwrap();
    dao.create_table(&users).unwrap();
    dao.create_table(&posts).unwrap();

    Blog { dao, users, posts }
}

impl Blog {
    fn add_user(&self, name: &str) -> i64 {
        let mut user = self.users.new_record().with("name", name).unwrap();
        self.dao.insert(&self.users, &mut user).unwrap()
    }

    fn add_post(&self, title: &str, user_id: i64) -> Record {
        let mut post = self
            .posts
            .new_record()
            .with("title", title)
            .unwrap()
            .with("user_id", user_id)
            .unwrap();
        self.dao.insert(&self.posts, &mut post).unwrap();
        post
    }
}

fn titles(record: &Record) -> Vec<String> {
    record
        .relation("posts")
        .expect("relation loaded")
        .iter()
        .map(|p| p.get_as::<String>("title").unwrap())
        .collect()
}

#[test]
fn related_rows_load_in_insertion_order() {
    let blog = blog(false);
    let ashwin = blog.add_user("Ashwin");
    let p1 = blog.add_post("Post 1", ashwin);
    let p2 = blog.add_post("Post 2", ashwin);

    let user = blog.dao.get_by_id(&blog.users, ashwin, true).unwrap().unwrap();
    assert_eq!(user.relation("posts"), Some(&[p1, p2][..]));
}

#[test]
fn owner_without_related_rows_gets_empty_vec() {
    let blog = blog(false);
    let kukku = blog.add_user("Kukku");

    let user = blog.dao.get_by_id(&blog.users, kukku, true).unwrap().unwrap();
    assert_eq!(user.relation("posts"), Some(&[][..]));
}

#[test]
fn lazy_relation_waits_for_request() {
    let blog = blog(false);
    let ashwin = blog.add_user("Ashwin");
    blog.add_post("Post 1", ashwin);

    let mut user = blog
        .dao
        .fetch_one(&blog.users, &Filter::new().eq("name", "Ashwin"), false)
        .unwrap()
        .unwrap();
    assert!(user.relation("posts").is_none());
    assert_eq!(
        user.to_json().unwrap(),
        serde_json::json!({"id": ashwin, "name": "Ashwin"})
    );

    blog.dao.load_relations(&blog.users, &mut user).unwrap();
    assert_eq!(titles(&user), ["Post 1"]);
}

#[test]
fn eager_relation_loads_without_request() {
    let blog = blog(true);
    let ashwin = blog.add_user("Ashwin");
    blog.add_post("Post 1", ashwin);

    let user = blog.dao.get_by_id(&blog.users, ashwin, false).unwrap().unwrap();
    assert_eq!(titles(&user), ["Post 1"]);
}

#[test]
fn fetch_all_groups_posts_per_user() {
    let blog = blog(false);
    let ashwin = blog.add_user("Ashwin");
    let kukku = blog.add_user("Kukku");
    let hai = blog.add_user("Hai");
    blog.add_post("Post 1", ashwin);
    blog.add_post("Post 2", kukku);
    blog.add_post("Post 3", ashwin);

    let all = blog.dao.fetch_all(&blog.users, true).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(titles(&all[0]), ["Post 1", "Post 3"]);
    assert_eq!(titles(&all[1]), ["Post 2"]);
    assert!(titles(&all[2]).is_empty());
    assert_eq!(all[2].get_as::<i64>("id").unwrap(), hai);
}

#[test]
fn loaded_posts_do_not_expand_further() {
    let blog = blog(true);
    let ashwin = blog.add_user("Ashwin");
    blog.add_post("Post 1", ashwin);

    let all = blog.dao.fetch_all(&blog.users, true).unwrap();
    let post = &all[0].relation("posts").unwrap()[0];
    assert_eq!(post.relations().count(), 0);
    assert_eq!(post.table(), "posts");
}

#[test]
fn foreign_keys_are_enforced() {
    let blog = blog(false);
    let mut orphan = blog
        .posts
        .new_record()
        .with("title", "Orphan")
        .unwrap()
        .with("user_id", 99)
        .unwrap();
    let err = blog.dao.insert(&blog.posts, &mut orphan).unwrap_err();
    assert!(err.is_foreign_key_violation(), "{err:?}");
}

#[test]
fn relation_over_text_column_is_refused() {
    let posts = Schema::builder("Post", "posts")
        .field(FieldDescriptor::integer("id").primary_key())
        .field(FieldDescriptor::text("user_id"))
        .register()
        .unwrap();
    let err = Schema::builder("User", "users")
        .field(FieldDescriptor::integer("id").primary_key())
        .relation(RelationDescriptor::has_many(&posts))
        .register()
        .unwrap_err();
    assert!(matches!(err, liteorm::OrmError::SchemaViolation(_)), "{err:?}");
}
