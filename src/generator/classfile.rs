//! @ai:module:intent Read JVM class file structure without loading the class
//! @ai:module:layer domain
//! @ai:module:public_api ClassFile, MemberInfo, parse, ACC_PUBLIC, ACC_STATIC, ACC_FINAL
//! @ai:module:stateless true
//!
//! Reads exactly the slices of the class file format the descriptor pass
//! needs: constant pool, class/member access flags and names, and
//! RuntimeVisibleAnnotations. Everything else is skipped by length.

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;

const MAGIC: u32 = 0xCAFE_BABE;

/// @ai:intent Parsed view of one class file
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Internal binary name, e.g. "com/example/FooBench".
    pub name: String,
    pub access: u16,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
}

/// @ai:intent One field or method with its annotation type descriptors
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub name: String,
    pub access: u16,
    /// Annotation type descriptors, e.g. "Lorg/openjdk/jmh/annotations/Benchmark;".
    pub annotations: Vec<String>,
}

impl ClassFile {
    /// @ai:intent Fully-qualified dotted name
    /// @ai:effects pure
    pub fn dotted_name(&self) -> String {
        self.name.replace('/', ".")
    }
}

impl MemberInfo {
    /// @ai:effects pure
    pub fn has_annotation(&self, descriptor: &str) -> bool {
        self.annotations.iter().any(|a| a == descriptor)
    }
}

/// @ai:intent Parse class file bytes; errors carry a byte-offset reason
/// @ai:effects pure
pub fn parse(bytes: &[u8]) -> Result<ClassFile, String> {
    let mut reader = Reader { bytes, pos: 0 };

    if reader.u4()? != MAGIC {
        return Err("bad magic number".to_string());
    }
    reader.u2()?; // minor version
    reader.u2()?; // major version

    let pool = ConstantPool::parse(&mut reader)?;

    let access = reader.u2()?;
    let this_class = reader.u2()?;
    let name = pool.class_name(this_class)?;
    reader.u2()?; // super class

    let interfaces = reader.u2()?;
    for _ in 0..interfaces {
        reader.u2()?;
    }

    let fields = parse_members(&mut reader, &pool)?;
    let methods = parse_members(&mut reader, &pool)?;

    Ok(ClassFile {
        name,
        access,
        fields,
        methods,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        if self.pos + n > self.bytes.len() {
            return Err(format!("truncated class file at offset {}", self.pos));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u1(&mut self) -> Result<u8, String> {
        Ok(self.take(1)?[0])
    }

    fn u2(&mut self) -> Result<u16, String> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u4(&mut self) -> Result<u32, String> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Only Utf8 and Class entries are retained; other entries just need their
/// sizes honored so indexing stays correct.
enum Constant {
    Utf8(String),
    Class(u16),
    Other,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut Reader<'_>) -> Result<Self, String> {
        let count = reader.u2()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Other); // index 0 is unused

        let mut index = 1;
        while index < count {
            let tag = reader.u1()?;
            let mut double_width = false;
            let entry = match tag {
                1 => {
                    let length = reader.u2()? as usize;
                    let bytes = reader.take(length)?;
                    // Modified UTF-8; class and member names are plain ASCII
                    // in practice, so a lossy conversion is sufficient here.
                    Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
                }
                7 => Constant::Class(reader.u2()?),
                8 | 16 | 19 | 20 => {
                    reader.u2()?;
                    Constant::Other
                }
                15 => {
                    reader.u1()?;
                    reader.u2()?;
                    Constant::Other
                }
                3 | 4 => {
                    reader.u4()?;
                    Constant::Other
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.u2()?;
                    reader.u2()?;
                    Constant::Other
                }
                5 | 6 => {
                    reader.u4()?;
                    reader.u4()?;
                    double_width = true;
                    Constant::Other
                }
                other => return Err(format!("unknown constant pool tag {other}")),
            };
            entries.push(entry);
            index += 1;
            if double_width {
                // Longs and doubles occupy two constant pool slots.
                entries.push(Constant::Other);
                index += 1;
            }
        }

        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, String> {
        match self.entries.get(index as usize) {
            Some(Constant::Utf8(s)) => Ok(s),
            _ => Err(format!("constant {index} is not a Utf8 entry")),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, String> {
        match self.entries.get(index as usize) {
            Some(Constant::Class(name_index)) => Ok(self.utf8(*name_index)?.to_string()),
            _ => Err(format!("constant {index} is not a Class entry")),
        }
    }
}

fn parse_members(reader: &mut Reader<'_>, pool: &ConstantPool) -> Result<Vec<MemberInfo>, String> {
    let count = reader.u2()?;
    let mut members = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let access = reader.u2()?;
        let name_index = reader.u2()?;
        let name = pool.utf8(name_index)?.to_string();
        reader.u2()?; // descriptor
        let annotations = parse_member_attributes(reader, pool)?;
        members.push(MemberInfo {
            name,
            access,
            annotations,
        });
    }

    Ok(members)
}

fn parse_member_attributes(
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<String>, String> {
    let count = reader.u2()?;
    let mut annotations = Vec::new();

    for _ in 0..count {
        let name_index = reader.u2()?;
        let length = reader.u4()? as usize;
        if pool.utf8(name_index)? == "RuntimeVisibleAnnotations" {
            let end = reader.pos + length;
            let annotation_count = reader.u2()?;
            for _ in 0..annotation_count {
                let type_index = parse_annotation(reader)?;
                annotations.push(pool.utf8(type_index)?.to_string());
            }
            if reader.pos != end {
                return Err("annotation attribute length mismatch".to_string());
            }
        } else {
            reader.take(length)?;
        }
    }

    Ok(annotations)
}

/// Returns the annotation's type descriptor index, consuming all
/// element-value pairs.
fn parse_annotation(reader: &mut Reader<'_>) -> Result<u16, String> {
    let type_index = reader.u2()?;
    let pairs = reader.u2()?;
    for _ in 0..pairs {
        reader.u2()?; // element name
        skip_element_value(reader)?;
    }
    Ok(type_index)
}

fn skip_element_value(reader: &mut Reader<'_>) -> Result<(), String> {
    let tag = reader.u1()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            reader.u2()?;
        }
        b'e' => {
            reader.u2()?;
            reader.u2()?;
        }
        b'@' => {
            parse_annotation(reader)?;
        }
        b'[' => {
            let count = reader.u2()?;
            for _ in 0..count {
                skip_element_value(reader)?;
            }
        }
        other => return Err(format!("unknown element value tag {other}")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fixture::TestClass;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_class_with_annotated_method() {
        let bytes = TestClass::new("com/example/FooBench")
            .method(
                "measure",
                ACC_PUBLIC,
                &["Lorg/openjdk/jmh/annotations/Benchmark;"],
            )
            .build();

        let class = parse(&bytes).unwrap();
        assert_eq!(class.name, "com/example/FooBench");
        assert_eq!(class.dotted_name(), "com.example.FooBench");
        assert_eq!(class.access & ACC_PUBLIC, ACC_PUBLIC);

        let method = class.methods.iter().find(|m| m.name == "measure").unwrap();
        assert!(method.has_annotation("Lorg/openjdk/jmh/annotations/Benchmark;"));
    }

    #[test]
    fn test_parse_field_annotations_and_flags() {
        let bytes = TestClass::new("com/example/Tunable")
            .field(
                "size",
                ACC_PUBLIC | ACC_FINAL,
                &["Lorg/openjdk/jmh/annotations/Param;"],
            )
            .build();

        let class = parse(&bytes).unwrap();
        let field = class.fields.iter().find(|f| f.name == "size").unwrap();
        assert!(field.has_annotation("Lorg/openjdk/jmh/annotations/Param;"));
        assert_eq!(field.access & ACC_FINAL, ACC_FINAL);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let err = parse(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0]).unwrap_err();
        assert!(err.contains("magic"));
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let mut bytes = TestClass::new("com/example/Cut")
            .method("run", ACC_PUBLIC, &[])
            .build();
        bytes.truncate(bytes.len() - 3);

        let err = parse(&bytes).unwrap_err();
        assert!(err.contains("truncated"));
    }
}
