// src/models/category.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Elektronik")]
    pub name: String,
    #[schema(example = "elektronik")]
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "Kategori adı zorunludur."))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, message = "Kategori adı boş olamaz."))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Absent keeps the parent, `null` moves the category to the root.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Nests a flat category list. Categories whose parent is missing from the
/// list are treated as roots.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let known: std::collections::HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();

    for category in categories {
        let parent = category.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(category);
    }

    fn attach(parent: Option<Uuid>, by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>) -> Vec<CategoryNode> {
        let mut level = by_parent.remove(&parent).unwrap_or_default();
        level.sort_by(|a, b| a.name.cmp(&b.name));
        level
            .into_iter()
            .map(|category| {
                let children = attach(Some(category.id), by_parent);
                CategoryNode { category, children }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

/// True if making `new_parent` the parent of `category_id` would close a loop.
pub fn would_create_cycle(categories: &[Category], category_id: Uuid, new_parent: Uuid) -> bool {
    let parents: HashMap<Uuid, Option<Uuid>> = categories.iter().map(|c| (c.id, c.parent_id)).collect();

    let mut cursor = Some(new_parent);
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == category_id {
            return true;
        }
        steps += 1;
        if steps > categories.len() {
            // existing data already loops
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_distinguishes_absent_from_null() {
        let absent: UpdateCategoryPayload = serde_json::from_str(r#"{"name":"Elektronik"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let root: UpdateCategoryPayload = serde_json::from_str(r#"{"parentId":null}"#).unwrap();
        assert_eq!(root.parent_id, Some(None));

        let id = Uuid::new_v4();
        let moved: UpdateCategoryPayload = serde_json::from_str(&format!(r#"{{"parentId":"{}"}}"#, id)).unwrap();
        assert_eq!(moved.parent_id, Some(Some(id)));
    }

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: crate::common::slug::slugify(name),
            description: None,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn builds_nested_tree() {
        let root = category("Ana Kategori", None);
        let child = category("Elektronik", Some(root.id));
        let grandchild = category("Telefon", Some(child.id));
        let other_root = category("Giyim", None);

        let tree = build_tree(vec![grandchild, child, other_root, root]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.name, "Ana Kategori");
        assert_eq!(tree[0].children[0].category.name, "Elektronik");
        assert_eq!(tree[0].children[0].children[0].category.name, "Telefon");
        assert_eq!(tree[1].category.name, "Giyim");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn orphan_becomes_root() {
        let orphan = category("Yetim", Some(Uuid::new_v4()));
        let tree = build_tree(vec![orphan]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn detects_cycles() {
        let root = category("Ana", None);
        let child = category("Alt", Some(root.id));
        let grandchild = category("Alt Alt", Some(child.id));
        let all = vec![root.clone(), child.clone(), grandchild.clone()];

        assert!(would_create_cycle(&all, root.id, root.id));
        assert!(would_create_cycle(&all, root.id, grandchild.id));
        assert!(!would_create_cycle(&all, grandchild.id, root.id));
    }
}
