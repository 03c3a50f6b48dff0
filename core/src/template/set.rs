//! Deduplicated template list

use super::generalized::Template;
use std::ops::Index;

/// Templates in first-seen order, unique up to slot renaming
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of an equal template already in the set, inserting `template` if there is none
    pub fn insert(&mut self, template: Template) -> usize {
        match self.position(&template) {
            Some(index) => index,
            None => {
                self.templates.push(template);
                self.templates.len() - 1
            }
        }
    }

    /// Index of the template equal to `template`
    pub fn position(&self, template: &Template) -> Option<usize> {
        self.templates.iter().position(|t| t == template)
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }
}

impl Index<usize> for TemplateSet {
    type Output = Template;

    fn index(&self, index: usize) -> &Template {
        &self.templates[index]
    }
}

impl FromIterator<Template> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        let mut set = TemplateSet::new();
        for template in iter {
            set.insert(template);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TemplateSet {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}
