//! @ai:module:intent Build minimal class file bytes for generator tests
//! @ai:module:layer domain
//! @ai:module:public_api TestClass

use crate::generator::classfile::ACC_PUBLIC;

const ACC_SUPER: u16 = 0x0020;

/// @ai:intent Builder for a syntactically valid class file with chosen
///            access flags and annotated members
pub struct TestClass {
    name: String,
    access: u16,
    fields: Vec<Member>,
    methods: Vec<Member>,
}

struct Member {
    name: String,
    descriptor: String,
    access: u16,
    annotations: Vec<String>,
}

impl TestClass {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access: ACC_PUBLIC | ACC_SUPER,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access | ACC_SUPER;
        self
    }

    pub fn method(mut self, name: &str, access: u16, annotations: &[&str]) -> Self {
        self.methods.push(Member {
            name: name.to_string(),
            descriptor: "()V".to_string(),
            access,
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    pub fn field(mut self, name: &str, access: u16, annotations: &[&str]) -> Self {
        self.fields.push(Member {
            name: name.to_string(),
            descriptor: "I".to_string(),
            access,
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();
        let this_class = pool.class(&self.name);
        let super_class = pool.class("java/lang/Object");

        let annotations_attribute = self
            .fields
            .iter()
            .chain(self.methods.iter())
            .any(|m| !m.annotations.is_empty())
            .then(|| pool.utf8("RuntimeVisibleAnnotations"));

        let fields = allocate_members(&self.fields, &mut pool);
        let methods = allocate_members(&self.methods, &mut pool);

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&52u16.to_be_bytes()); // major (Java 8)
        out.extend_from_slice(&(pool.entries.len() as u16 + 1).to_be_bytes());
        for entry in &pool.entries {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces

        for group in [&fields, &methods] {
            out.extend_from_slice(&(group.len() as u16).to_be_bytes());
            for member in group {
                write_member(&mut out, member, annotations_attribute);
            }
        }

        out.extend_from_slice(&0u16.to_be_bytes()); // class attributes
        out
    }
}

struct AllocatedMember {
    access: u16,
    name: u16,
    descriptor: u16,
    annotations: Vec<u16>,
}

fn allocate_members(members: &[Member], pool: &mut Pool) -> Vec<AllocatedMember> {
    members
        .iter()
        .map(|member| AllocatedMember {
            access: member.access,
            name: pool.utf8(&member.name),
            descriptor: pool.utf8(&member.descriptor),
            annotations: member.annotations.iter().map(|a| pool.utf8(a)).collect(),
        })
        .collect()
}

fn write_member(out: &mut Vec<u8>, member: &AllocatedMember, annotations_attribute: Option<u16>) {
    out.extend_from_slice(&member.access.to_be_bytes());
    out.extend_from_slice(&member.name.to_be_bytes());
    out.extend_from_slice(&member.descriptor.to_be_bytes());

    if member.annotations.is_empty() {
        out.extend_from_slice(&0u16.to_be_bytes());
        return;
    }

    let attribute_name = annotations_attribute.expect("annotation attribute name allocated");
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&attribute_name.to_be_bytes());
    // num_annotations + (type_index + num_pairs) per annotation
    let length = 2 + 4 * member.annotations.len() as u32;
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&(member.annotations.len() as u16).to_be_bytes());
    for annotation in &member.annotations {
        out.extend_from_slice(&annotation.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // no element-value pairs
    }
}

#[derive(Default)]
struct Pool {
    entries: Vec<Vec<u8>>,
}

impl Pool {
    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![1u8];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        self.push(entry)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut entry = vec![7u8];
        entry.extend_from_slice(&name_index.to_be_bytes());
        self.push(entry)
    }

    fn push(&mut self, entry: Vec<u8>) -> u16 {
        self.entries.push(entry);
        self.entries.len() as u16
    }
}
