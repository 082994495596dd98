//! Image builder: lays out descriptors, directory sectors, system use fields
//! and path tables at caller-chosen sectors.

use crate::common::MemoryBlockDevice;

pub const SECTOR: usize = 2048;

/// Record layout to encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Iso,
    HighSierra,
    Cdi,
}

fn both_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

fn both_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}

/// UCS-2 big-endian name, as Joliet stores it
pub fn ucs2(name: &str) -> Vec<u8> {
    name.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// One directory record
#[derive(Debug, Clone)]
pub struct Record {
    pub name: Vec<u8>,
    pub lba: u32,
    pub size: u32,
    pub flags: u8,
    pub date: [u8; 7],
    pub system_use: Vec<u8>,
}

impl Record {
    pub fn new(name: &[u8], lba: u32, size: u32, flags: u8) -> Self {
        Self {
            name: name.to_vec(),
            lba,
            size,
            flags,
            date: [99, 12, 31, 23, 59, 0, 0],
            system_use: Vec::new(),
        }
    }

    pub fn dot(lba: u32, size: u32) -> Self {
        Self::new(&[0], lba, size, 0x02)
    }

    pub fn dotdot(lba: u32, size: u32) -> Self {
        Self::new(&[1], lba, size, 0x02)
    }

    pub fn file(name: &str, lba: u32, size: u32) -> Self {
        Self::new(name.as_bytes(), lba, size, 0x00)
    }

    pub fn dir(name: &str, lba: u32, size: u32) -> Self {
        Self::new(name.as_bytes(), lba, size, 0x02)
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn system_use(mut self, fields: &[Vec<u8>]) -> Self {
        self.system_use = fields.concat();
        self
    }

    pub fn encode(&self, layout: Layout) -> Vec<u8> {
        let name_length = self.name.len();
        let mut su_start = 33 + name_length;
        if su_start % 2 != 0 {
            su_start += 1;
        }
        let mut length = su_start + self.system_use.len();
        if length % 2 != 0 {
            length += 1;
        }
        assert!(length <= 255, "record too long");

        let mut r = vec![0u8; length];
        r[0] = length as u8;

        match layout {
            Layout::Iso | Layout::HighSierra => {
                both_u32(&mut r[2..10], self.lba);
                both_u32(&mut r[10..18], self.size);
                both_u16(&mut r[28..32], 1);
                if layout == Layout::Iso {
                    r[18..25].copy_from_slice(&self.date);
                    r[25] = self.flags;
                } else {
                    r[18..24].copy_from_slice(&self.date[..6]);
                    r[24] = self.flags;
                }
            }
            Layout::Cdi => {
                r[6..10].copy_from_slice(&self.lba.to_be_bytes());
                r[14..18].copy_from_slice(&self.size.to_be_bytes());
                r[18..24].copy_from_slice(&self.date[..6]);
                r[25] = self.flags & 0x01;
                r[30..32].copy_from_slice(&1u16.to_be_bytes());
            }
        }

        r[32] = name_length as u8;
        r[33..33 + name_length].copy_from_slice(&self.name);
        r[su_start..su_start + self.system_use.len()].copy_from_slice(&self.system_use);
        r
    }
}

/// CD-i system area: group, owner, attributes, reserved, file number
pub fn cdi_area(attributes: u16, file_number: u8) -> Vec<u8> {
    let mut area = vec![0u8; 10];
    area[0..2].copy_from_slice(&7u16.to_be_bytes());
    area[2..4].copy_from_slice(&9u16.to_be_bytes());
    area[4..6].copy_from_slice(&attributes.to_be_bytes());
    area[8] = file_number;
    area
}

/// Encode path table records (name, extent, parent)
pub fn path_table(layout: Layout, entries: &[(&[u8], u32, u16)]) -> Vec<u8> {
    let mut table = Vec::new();
    for (name, extent, parent) in entries {
        let mut record = vec![0u8; 8];
        match layout {
            Layout::Iso => {
                record[0] = name.len() as u8;
                record[2..6].copy_from_slice(&extent.to_le_bytes());
                record[6..8].copy_from_slice(&parent.to_le_bytes());
            }
            Layout::Cdi => {
                record[0] = name.len() as u8;
                record[2..6].copy_from_slice(&extent.to_be_bytes());
                record[6..8].copy_from_slice(&parent.to_be_bytes());
            }
            Layout::HighSierra => {
                record[0..4].copy_from_slice(&extent.to_le_bytes());
                record[5] = name.len() as u8;
                record[6..8].copy_from_slice(&parent.to_le_bytes());
            }
        }
        record.extend_from_slice(name);
        if name.len() % 2 != 0 {
            record.push(0);
        }
        table.extend(record);
    }
    table
}

/// System use field encoders
pub mod susp {
    fn field(tag: &[u8; 2], body: &[u8]) -> Vec<u8> {
        let mut f = vec![tag[0], tag[1], (4 + body.len()) as u8, 1];
        f.extend_from_slice(body);
        f
    }

    fn both(value: u32) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0..4].copy_from_slice(&value.to_le_bytes());
        out[4..8].copy_from_slice(&value.to_be_bytes());
        out
    }

    pub fn sp() -> Vec<u8> {
        field(b"SP", &[0xBE, 0xEF, 0])
    }

    pub fn rr(flags: u8) -> Vec<u8> {
        field(b"RR", &[flags])
    }

    pub fn pd(length: usize) -> Vec<u8> {
        field(b"PD", &vec![0; length - 4])
    }

    pub fn nm(flags: u8, name: &[u8]) -> Vec<u8> {
        let mut body = vec![flags];
        body.extend_from_slice(name);
        field(b"NM", &body)
    }

    /// SL with (component flags, content) components
    pub fn sl(flags: u8, components: &[(u8, &[u8])]) -> Vec<u8> {
        let mut body = vec![flags];
        for (component_flags, content) in components {
            body.push(*component_flags);
            body.push(content.len() as u8);
            body.extend_from_slice(content);
        }
        field(b"SL", &body)
    }

    pub fn px(mode: u32, links: u32, uid: u32, gid: u32) -> Vec<u8> {
        let body: Vec<u8> = [mode, links, uid, gid].iter().flat_map(|v| both(*v)).collect();
        field(b"PX", &body)
    }

    pub fn px_serial(mode: u32, links: u32, uid: u32, gid: u32, serial: u32) -> Vec<u8> {
        let body: Vec<u8> = [mode, links, uid, gid, serial].iter().flat_map(|v| both(*v)).collect();
        field(b"PX", &body)
    }

    pub fn pn(high: u32, low: u32) -> Vec<u8> {
        let body: Vec<u8> = [high, low].iter().flat_map(|v| both(*v)).collect();
        field(b"PN", &body)
    }

    pub fn tf(flags: u8, stamps: &[&[u8]]) -> Vec<u8> {
        let mut body = vec![flags];
        for stamp in stamps {
            body.extend_from_slice(stamp);
        }
        field(b"TF", &body)
    }

    pub fn ce(block: u32, offset: u32, length: u32) -> Vec<u8> {
        let body: Vec<u8> = [block, offset, length].iter().flat_map(|v| both(*v)).collect();
        field(b"CE", &body)
    }

    pub fn cl(lba: u32) -> Vec<u8> {
        field(b"CL", &both(lba))
    }

    pub fn pl(lba: u32) -> Vec<u8> {
        field(b"PL", &both(lba))
    }

    pub fn re() -> Vec<u8> {
        field(b"RE", &[])
    }

    /// New-style Apple HFS field
    pub fn aa_hfs(file_type: &[u8; 4], creator: &[u8; 4], finder_flags: u16) -> Vec<u8> {
        let mut f = vec![b'A', b'A', 14, 2];
        f.extend_from_slice(file_type);
        f.extend_from_slice(creator);
        f.extend_from_slice(&finder_flags.to_be_bytes());
        f
    }

    /// New-style Apple ProDOS field
    pub fn aa_prodos(file_type: u8, aux_type: u16) -> Vec<u8> {
        let mut f = vec![b'A', b'A', 7, 1, file_type];
        f.extend_from_slice(&aux_type.to_le_bytes());
        f
    }

    /// Old-style Apple type/creator field
    pub fn apple_old_type_creator(file_type: &[u8; 4], creator: &[u8; 4]) -> Vec<u8> {
        let mut f = vec![0xBA, 0xAC, 1];
        f.extend_from_slice(file_type);
        f.extend_from_slice(creator);
        f
    }

    /// Old-style Apple type/creator/icon field (id 3)
    pub fn apple_old_icon(file_type: &[u8; 4], creator: &[u8; 4], icon: &[u8; 32]) -> Vec<u8> {
        let mut f = vec![0xBA, 0xAC, 3];
        f.extend_from_slice(file_type);
        f.extend_from_slice(creator);
        f.extend_from_slice(icon);
        f
    }

    /// Old-style Apple HFS field (id 5)
    pub fn apple_old_hfs(file_type: &[u8; 4], creator: &[u8; 4], finder_flags: u16) -> Vec<u8> {
        let mut f = vec![0xBA, 0xAC, 5];
        f.extend_from_slice(file_type);
        f.extend_from_slice(creator);
        f.extend_from_slice(&finder_flags.to_be_bytes());
        f
    }

    /// AAIP field sharing the "AA" signature, its version byte reads as ProDOS id 1
    pub fn aa_aaip(payload: &[u8]) -> Vec<u8> {
        field(b"AA", payload)
    }

    /// AAIP attribute field
    pub fn al(payload: &[u8]) -> Vec<u8> {
        field(b"AL", payload)
    }

    /// Amiga protection bytes and comment
    pub fn amiga(protection: [u8; 4], comment: &[u8]) -> Vec<u8> {
        let mut body = vec![0x03];
        body.extend_from_slice(&protection);
        body.push((comment.len() + 1) as u8);
        body.extend_from_slice(comment);
        field(b"AS", &body)
    }

    /// CD-ROM XA structure
    pub fn xa(group: u16, user: u16, attributes: u16, file_number: u8) -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(&group.to_be_bytes());
        f.extend_from_slice(&user.to_be_bytes());
        f.extend_from_slice(&attributes.to_be_bytes());
        f.extend_from_slice(b"XA");
        f.push(file_number);
        f.extend_from_slice(&[0; 5]);
        f
    }
}

/// Builds an image sector by sector
pub struct IsoBuilder {
    data: Vec<u8>,
    sectors: u32,
}

impl IsoBuilder {
    pub fn new(sectors: u32) -> Self {
        Self {
            data: vec![0u8; sectors as usize * SECTOR],
            sectors,
        }
    }

    pub fn sector_mut(&mut self, lba: u32) -> &mut [u8] {
        let start = lba as usize * SECTOR;
        &mut self.data[start..start + SECTOR]
    }

    /// Raw bytes at a sector
    pub fn write(&mut self, lba: u32, bytes: &[u8]) -> &mut Self {
        let start = lba as usize * SECTOR;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Primary Volume Descriptor at 16, root record without system use
    pub fn primary(&mut self, volume_id: &str, root_lba: u32, root_size: u32) -> &mut Self {
        let sectors = self.sectors;
        let pvd = self.sector_mut(16);
        pvd[0] = 1;
        pvd[1..6].copy_from_slice(b"CD001");
        pvd[6] = 1;
        pvd[40..72].fill(b' ');
        pvd[40..40 + volume_id.len()].copy_from_slice(volume_id.as_bytes());
        both_u32(&mut pvd[80..88], sectors);
        both_u16(&mut pvd[128..132], 2048);
        let root = Record::dot(root_lba, root_size).encode(Layout::Iso);
        pvd[156..156 + root.len()].copy_from_slice(&root);
        self
    }

    /// Path table location of the descriptor at `descriptor`
    pub fn path_table_location(&mut self, descriptor: u32, lba: u32, size: u32) -> &mut Self {
        let sector = self.sector_mut(descriptor);
        both_u32(&mut sector[132..140], size);
        sector[140..144].copy_from_slice(&lba.to_le_bytes());
        self
    }

    /// Joliet Supplementary Volume Descriptor
    pub fn joliet(&mut self, descriptor: u32, root_lba: u32, root_size: u32) -> &mut Self {
        let sectors = self.sectors;
        let svd = self.sector_mut(descriptor);
        svd[0] = 2;
        svd[1..6].copy_from_slice(b"CD001");
        svd[6] = 1;
        both_u32(&mut svd[80..88], sectors);
        svd[88..91].copy_from_slice(b"%/E");
        both_u16(&mut svd[128..132], 2048);
        let root = Record::dot(root_lba, root_size).encode(Layout::Iso);
        svd[156..156 + root.len()].copy_from_slice(&root);
        self
    }

    /// Volume Descriptor Set Terminator
    pub fn terminator(&mut self, descriptor: u32) -> &mut Self {
        let sector = self.sector_mut(descriptor);
        sector[0] = 255;
        sector[1..6].copy_from_slice(b"CD001");
        sector[6] = 1;
        self
    }

    /// High Sierra descriptor at 16 and terminator at 17
    pub fn high_sierra(&mut self, volume_id: &str, root_lba: u32, root_size: u32) -> &mut Self {
        let sectors = self.sectors;
        let sfsvd = self.sector_mut(16);
        sfsvd[8] = 1;
        sfsvd[9..14].copy_from_slice(b"CDROM");
        sfsvd[14] = 1;
        sfsvd[48..80].fill(b' ');
        sfsvd[48..48 + volume_id.len()].copy_from_slice(volume_id.as_bytes());
        both_u32(&mut sfsvd[88..96], sectors);
        both_u16(&mut sfsvd[136..140], 2048);
        let root = Record::dot(root_lba, root_size).encode(Layout::HighSierra);
        sfsvd[180..180 + root.len()].copy_from_slice(&root);

        let terminator = self.sector_mut(17);
        terminator[8] = 255;
        terminator[9..14].copy_from_slice(b"CDROM");
        self
    }

    /// High Sierra path table location
    pub fn high_sierra_path_table(&mut self, lba: u32, size: u32) -> &mut Self {
        let sector = self.sector_mut(16);
        both_u32(&mut sector[140..148], size);
        sector[148..152].copy_from_slice(&lba.to_le_bytes());
        self
    }

    /// CD-i Disc Label at 16 with its M-type path table
    pub fn cdi(&mut self, volume_id: &str, path_table_lba: u32, path_table_size: u32) -> &mut Self {
        let sectors = self.sectors;
        let label = self.sector_mut(16);
        label[0] = 1;
        label[1..6].copy_from_slice(b"CD-I ");
        label[6] = 1;
        label[40..72].fill(b' ');
        label[40..40 + volume_id.len()].copy_from_slice(volume_id.as_bytes());
        label[84..88].copy_from_slice(&sectors.to_be_bytes());
        label[130..132].copy_from_slice(&2048u16.to_be_bytes());
        label[136..140].copy_from_slice(&path_table_size.to_be_bytes());
        label[148..152].copy_from_slice(&path_table_lba.to_be_bytes());
        self
    }

    /// Directory records from the start of `lba`, moving to the next sector
    /// when a record does not fit
    pub fn directory(&mut self, layout: Layout, lba: u32, records: &[Record]) -> &mut Self {
        let mut sector = lba as usize;
        let mut offset = 0;
        for record in records {
            let bytes = record.encode(layout);
            if offset + bytes.len() > SECTOR {
                sector += 1;
                offset = 0;
            }
            let start = sector * SECTOR + offset;
            self.data[start..start + bytes.len()].copy_from_slice(&bytes);
            offset += bytes.len();
        }
        self
    }

    pub fn build(&self) -> MemoryBlockDevice {
        MemoryBlockDevice::new(self.data.clone())
    }

    pub fn image(&self) -> Vec<u8> {
        self.data.clone()
    }
}

/// PVD at 16, terminator at 17, empty root directory at 18
pub fn minimal_iso() -> IsoBuilder {
    let mut builder = IsoBuilder::new(64);
    builder
        .primary("TEST VOLUME", 18, 2048)
        .terminator(17)
        .directory(Layout::Iso, 18, &[Record::dot(18, 2048), Record::dotdot(18, 2048)]);
    builder
}
